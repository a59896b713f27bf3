//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them to
//! domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{categories, preferences, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub external_account: Option<String>,
}

/// Insertable for `users`; `created_at` uses the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub external_account: Option<&'a str>,
}

/// Row read from `categories`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
}

/// Insertable for `categories`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

/// Row read from `preferences`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = preferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PreferenceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub level: i16,
}

/// Insertable for `preferences`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = preferences)]
pub(crate) struct NewPreferenceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub level: i16,
}

/// Changeset applied when a level changes.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = preferences)]
pub(crate) struct PreferenceLevelUpdate {
    pub level: i16,
    pub updated_at: DateTime<Utc>,
}
