//! Driving port for preference reads.

use async_trait::async_trait;

use crate::domain::{
    CategoryName, Error, Preference, PreferenceLevel, User, UserId, UserWithPreferences,
};

/// Read-side use-cases over users' preferences.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferencesQuery: Send + Sync {
    /// A user and all of their preferences.
    ///
    /// # Errors
    ///
    /// - `not_found` when the user does not exist.
    async fn user_with_preferences(&self, user_id: &UserId) -> Result<UserWithPreferences, Error>;

    /// The user's preferences within one category.
    ///
    /// # Errors
    ///
    /// - `not_found` when the category does not exist.
    async fn in_category(
        &self,
        user_id: &UserId,
        category: &CategoryName,
    ) -> Result<Vec<Preference>, Error>;

    /// The user's essential (level 5) preferences.
    async fn essential(&self, user_id: &UserId) -> Result<Vec<Preference>, Error>;

    /// Users holding exactly `level` for `category`.
    ///
    /// # Errors
    ///
    /// - `not_found` when the category does not exist.
    async fn users_with_preference(
        &self,
        category: &CategoryName,
        level: PreferenceLevel,
    ) -> Result<Vec<User>, Error>;
}
