//! Preference service implementing the preference driving ports.
//!
//! Categories are created on first write and looked up by normalized name.
//! Store-level uniqueness and foreign-key failures arrive as typed
//! [`PreferenceRepositoryError`] variants and are mapped here to conflict and
//! invalid-reference errors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::account_service::{USER_NOT_FOUND, map_user_persistence_error};
use crate::domain::ports::{
    PreferenceFilter, PreferenceRepository, PreferenceRepositoryError, PreferencesCommand,
    PreferencesQuery, UserRepository,
};
use crate::domain::{
    Category, CategoryName, Error, Preference, PreferenceId, PreferenceLevel, User, UserId,
    UserWithPreferences,
};

const CATEGORY_NOT_FOUND: &str = "Category not found";
const PREFERENCE_NOT_FOUND: &str = "Preference not found";
const PREFERENCE_EXISTS: &str = "Preference already exists for this user and category";
const INVALID_REFERENCE: &str = "Invalid user or category reference";

/// Preference use-cases backed by the preference and user repositories.
#[derive(Clone)]
pub struct PreferencesService<P, U> {
    preferences: Arc<P>,
    users: Arc<U>,
}

impl<P, U> PreferencesService<P, U> {
    /// Create a service over the given repositories.
    #[must_use]
    pub const fn new(preferences: Arc<P>, users: Arc<U>) -> Self {
        Self { preferences, users }
    }
}

fn map_preference_error(error: PreferenceRepositoryError) -> Error {
    match error {
        PreferenceRepositoryError::Duplicate { .. } => Error::conflict(PREFERENCE_EXISTS),
        PreferenceRepositoryError::InvalidReference { .. } => {
            Error::invalid_reference(INVALID_REFERENCE)
        }
        failure @ (PreferenceRepositoryError::Connection { .. }
        | PreferenceRepositoryError::Query { .. }) => Error::store_failure(failure.to_string()),
    }
}

impl<P, U> PreferencesService<P, U>
where
    P: PreferenceRepository,
{
    async fn require_category(&self, name: &CategoryName) -> Result<Category, Error> {
        self.preferences
            .find_category(name)
            .await
            .map_err(map_preference_error)?
            .ok_or_else(|| Error::not_found(CATEGORY_NOT_FOUND))
    }

    async fn list(
        &self,
        user_id: &UserId,
        filter: PreferenceFilter,
    ) -> Result<Vec<Preference>, Error> {
        self.preferences
            .list_for_user(user_id, filter)
            .await
            .map_err(map_preference_error)
    }
}

#[async_trait]
impl<P, U> PreferencesCommand for PreferencesService<P, U>
where
    P: PreferenceRepository,
    U: UserRepository,
{
    async fn add(
        &self,
        user_id: &UserId,
        name: &CategoryName,
        level: PreferenceLevel,
    ) -> Result<Preference, Error> {
        let category = self
            .preferences
            .find_or_create_category(name)
            .await
            .map_err(map_preference_error)?;
        let preference = Preference {
            id: PreferenceId::random(),
            user_id: *user_id,
            category: category.name,
            level,
        };
        self.preferences
            .insert(&preference, &category.id)
            .await
            .map_err(map_preference_error)?;

        info!(
            %user_id,
            category = %preference.category,
            level = preference.level.value(),
            "preference added"
        );
        Ok(preference)
    }

    async fn update(
        &self,
        user_id: &UserId,
        name: &CategoryName,
        level: PreferenceLevel,
    ) -> Result<Preference, Error> {
        let category = self.require_category(name).await?;
        let updated = self
            .preferences
            .update_level(user_id, &category, level)
            .await
            .map_err(map_preference_error)?
            .ok_or_else(|| Error::not_found(PREFERENCE_NOT_FOUND))?;

        debug!(%user_id, category = %updated.category, level = level.value(), "preference updated");
        Ok(updated)
    }

    async fn remove(&self, user_id: &UserId, name: &CategoryName) -> Result<bool, Error> {
        let Some(category) = self
            .preferences
            .find_category(name)
            .await
            .map_err(map_preference_error)?
        else {
            debug!(%user_id, category = %name, "remove skipped: unknown category");
            return Ok(false);
        };

        let removed = self
            .preferences
            .delete(user_id, &category.id)
            .await
            .map_err(map_preference_error)?;
        debug!(%user_id, category = %category.name, removed, "preference removal finished");
        Ok(removed)
    }
}

#[async_trait]
impl<P, U> PreferencesQuery for PreferencesService<P, U>
where
    P: PreferenceRepository,
    U: UserRepository,
{
    async fn user_with_preferences(&self, user_id: &UserId) -> Result<UserWithPreferences, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))?;
        let preferences = self.list(user_id, PreferenceFilter::All).await?;
        Ok(UserWithPreferences { user, preferences })
    }

    async fn in_category(
        &self,
        user_id: &UserId,
        name: &CategoryName,
    ) -> Result<Vec<Preference>, Error> {
        let category = self.require_category(name).await?;
        self.list(user_id, PreferenceFilter::Category(category.id)).await
    }

    async fn essential(&self, user_id: &UserId) -> Result<Vec<Preference>, Error> {
        self.list(user_id, PreferenceFilter::Level(PreferenceLevel::ESSENTIAL)).await
    }

    async fn users_with_preference(
        &self,
        name: &CategoryName,
        level: PreferenceLevel,
    ) -> Result<Vec<User>, Error> {
        let category = self.require_category(name).await?;
        self.preferences
            .users_with_level(&category.id, level)
            .await
            .map_err(map_preference_error)
    }
}

#[cfg(test)]
#[path = "preferences_service_tests.rs"]
mod tests;
