//! Diesel table definitions matching the embedded migrations.
//!
//! Keep in sync with `backend/migrations/`.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Application-generated UUID.
        id -> Uuid,
        /// Unique user name.
        name -> Varchar,
        /// Unique email address.
        email -> Varchar,
        /// bcrypt hash of the password.
        password_hash -> Varchar,
        /// Optional external anime-tracker account.
        external_account -> Nullable<Varchar>,
        /// Insertion timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shared genre vocabulary; names are stored lowercase.
    categories (id) {
        id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (user, category) pair.
    preferences (id) {
        id -> Uuid,
        user_id -> Uuid,
        category_id -> Uuid,
        /// Level in 1..=5, enforced by a CHECK constraint.
        level -> Int2,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(preferences -> users (user_id));
diesel::joinable!(preferences -> categories (category_id));

diesel::allow_tables_to_appear_in_same_query!(users, categories, preferences);
