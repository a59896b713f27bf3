//! Driven port for preference and category persistence.
//!
//! Adapters classify store failures into [`PreferenceRepositoryError`] so the
//! service can map duplicates and dangling references without inspecting
//! driver-specific error text.

use async_trait::async_trait;

use crate::domain::{
    Category, CategoryId, CategoryName, Preference, PreferenceLevel, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by preference repository adapters.
    pub enum PreferenceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "preference repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "preference repository query failed: {message}",
        /// The (user, category) pair already holds a preference.
        Duplicate { message: String } => "preference already exists: {message}",
        /// The write referenced a user or category that does not exist.
        InvalidReference { message: String } => "invalid reference: {message}",
    }
}

/// Narrows a listing of one user's preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceFilter {
    /// Every preference the user holds.
    All,
    /// Only the preference for one category.
    Category(CategoryId),
    /// Only preferences at exactly this level.
    Level(PreferenceLevel),
}

/// Storage for categories and per-user preferences.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Look up a category by normalized name.
    async fn find_category(
        &self,
        name: &CategoryName,
    ) -> Result<Option<Category>, PreferenceRepositoryError>;

    /// Return the category called `name`, creating it first when absent.
    ///
    /// Concurrent callers racing on the same name must observe the same row.
    async fn find_or_create_category(
        &self,
        name: &CategoryName,
    ) -> Result<Category, PreferenceRepositoryError>;

    /// Insert a preference pointing at `category_id`.
    async fn insert(
        &self,
        preference: &Preference,
        category_id: &CategoryId,
    ) -> Result<(), PreferenceRepositoryError>;

    /// Set the level of an existing preference.
    ///
    /// Returns `None` when the user holds no preference for the category.
    async fn update_level(
        &self,
        user_id: &UserId,
        category: &Category,
        level: PreferenceLevel,
    ) -> Result<Option<Preference>, PreferenceRepositoryError>;

    /// Delete the preference for (user, category). Returns whether a row was
    /// removed.
    async fn delete(
        &self,
        user_id: &UserId,
        category_id: &CategoryId,
    ) -> Result<bool, PreferenceRepositoryError>;

    /// List one user's preferences ordered by category name.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: PreferenceFilter,
    ) -> Result<Vec<Preference>, PreferenceRepositoryError>;

    /// Users holding exactly `level` for the category, ordered by name.
    async fn users_with_level(
        &self,
        category_id: &CategoryId,
        level: PreferenceLevel,
    ) -> Result<Vec<User>, PreferenceRepositoryError>;
}
