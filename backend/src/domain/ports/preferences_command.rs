//! Driving port for preference mutations.

use async_trait::async_trait;

use crate::domain::{CategoryName, Error, Preference, PreferenceLevel, UserId};

/// Create, update, and delete preferences addressed by (user, category).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferencesCommand: Send + Sync {
    /// Record a new preference, creating the category when needed.
    ///
    /// # Errors
    ///
    /// - `conflict` when the user already holds a preference for the category.
    /// - `invalid_reference` when the user does not exist.
    async fn add(
        &self,
        user_id: &UserId,
        category: &CategoryName,
        level: PreferenceLevel,
    ) -> Result<Preference, Error>;

    /// Change the level of an existing preference.
    ///
    /// # Errors
    ///
    /// - `not_found` when the category or the preference does not exist.
    async fn update(
        &self,
        user_id: &UserId,
        category: &CategoryName,
        level: PreferenceLevel,
    ) -> Result<Preference, Error>;

    /// Delete a preference. Returns `false` when nothing was deleted.
    async fn remove(&self, user_id: &UserId, category: &CategoryName) -> Result<bool, Error>;
}
