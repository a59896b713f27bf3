//! In-process store for tests and local experiments.
//!
//! [`InMemoryStore`] implements every driven persistence port against plain
//! collections behind a mutex. It enforces the same uniqueness and
//! referential rules as the PostgreSQL schema so HTTP-level tests observe the
//! same conflict and reference errors as production.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    PreferenceFilter, PreferenceRepository, PreferenceRepositoryError, StoreProbe,
    StoreProbeError, UserAccount, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Category, CategoryId, CategoryName, EmailAddress, Preference, PreferenceId, PreferenceLevel,
    User, UserId, UserName,
};

/// Genres present in a freshly migrated database.
pub const SEEDED_CATEGORIES: [&str; 4] = ["romance", "action", "comedy", "drama"];

#[derive(Debug, Clone)]
struct StoredPreference {
    id: PreferenceId,
    user_id: UserId,
    category_id: CategoryId,
    level: PreferenceLevel,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<UserAccount>,
    categories: Vec<Category>,
    preferences: Vec<StoredPreference>,
}

impl State {
    fn category_by_id(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| &category.id == id)
    }

    fn to_preference(&self, stored: &StoredPreference) -> Option<Preference> {
        self.category_by_id(&stored.category_id)
            .map(|category| Preference {
                id: stored.id,
                user_id: stored.user_id,
                category: category.name.clone(),
                level: stored.level,
            })
    }
}

/// Shared in-memory implementation of the persistence ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    unreachable: AtomicBool,
}

impl InMemoryStore {
    /// Empty store with no categories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the [`SEEDED_CATEGORIES`].
    #[must_use]
    pub fn seeded() -> Self {
        let state = State {
            categories: SEEDED_CATEGORIES
                .iter()
                .filter_map(|name| CategoryName::new(name).ok())
                .map(|name| Category {
                    id: CategoryId::random(),
                    name,
                })
                .collect(),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err("in-memory store marked unreachable".to_owned());
        }
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    fn users(&self) -> Result<MutexGuard<'_, State>, UserPersistenceError> {
        self.lock().map_err(UserPersistenceError::connection)
    }

    fn preferences(&self) -> Result<MutexGuard<'_, State>, PreferenceRepositoryError> {
        self.lock().map_err(PreferenceRepositoryError::connection)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.users()?;
        let clash = state.users.iter().find_map(|existing| {
            if existing.user.name() == account.user.name() {
                Some("users_name_key")
            } else if existing.user.email() == account.user.email() {
                Some("users_email_key")
            } else {
                None
            }
        });
        if let Some(constraint) = clash {
            return Err(UserPersistenceError::duplicate(constraint));
        }
        state.users.push(account.clone());
        Ok(())
    }

    async fn find_by_name(
        &self,
        name: &UserName,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.users()?;
        Ok(state
            .users
            .iter()
            .find(|account| account.user.name() == name)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.users()?;
        Ok(state
            .users
            .iter()
            .find(|account| account.user.id() == id)
            .map(|account| account.user.clone()))
    }

    async fn name_or_email_taken(
        &self,
        name: &UserName,
        email: &EmailAddress,
    ) -> Result<bool, UserPersistenceError> {
        let state = self.users()?;
        Ok(state
            .users
            .iter()
            .any(|account| account.user.name() == name || account.user.email() == email))
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryStore {
    async fn find_category(
        &self,
        name: &CategoryName,
    ) -> Result<Option<Category>, PreferenceRepositoryError> {
        let state = self.preferences()?;
        Ok(state
            .categories
            .iter()
            .find(|category| &category.name == name)
            .cloned())
    }

    async fn find_or_create_category(
        &self,
        name: &CategoryName,
    ) -> Result<Category, PreferenceRepositoryError> {
        let mut state = self.preferences()?;
        if let Some(existing) = state.categories.iter().find(|category| &category.name == name) {
            return Ok(existing.clone());
        }
        let created = Category {
            id: CategoryId::random(),
            name: name.clone(),
        };
        state.categories.push(created.clone());
        Ok(created)
    }

    async fn insert(
        &self,
        preference: &Preference,
        category_id: &CategoryId,
    ) -> Result<(), PreferenceRepositoryError> {
        let mut state = self.preferences()?;
        if !state
            .users
            .iter()
            .any(|account| account.user.id() == &preference.user_id)
        {
            return Err(PreferenceRepositoryError::invalid_reference(
                "preferences_user_id_fkey",
            ));
        }
        if state.category_by_id(category_id).is_none() {
            return Err(PreferenceRepositoryError::invalid_reference(
                "preferences_category_id_fkey",
            ));
        }
        if state.preferences.iter().any(|stored| {
            stored.user_id == preference.user_id && &stored.category_id == category_id
        }) {
            return Err(PreferenceRepositoryError::duplicate(
                "preferences_user_id_category_id_key",
            ));
        }
        state.preferences.push(StoredPreference {
            id: preference.id,
            user_id: preference.user_id,
            category_id: *category_id,
            level: preference.level,
        });
        Ok(())
    }

    async fn update_level(
        &self,
        user_id: &UserId,
        category: &Category,
        level: PreferenceLevel,
    ) -> Result<Option<Preference>, PreferenceRepositoryError> {
        let mut state = self.preferences()?;
        let Some(stored) = state
            .preferences
            .iter_mut()
            .find(|stored| &stored.user_id == user_id && stored.category_id == category.id)
        else {
            return Ok(None);
        };
        stored.level = level;
        Ok(Some(Preference {
            id: stored.id,
            user_id: stored.user_id,
            category: category.name.clone(),
            level,
        }))
    }

    async fn delete(
        &self,
        user_id: &UserId,
        category_id: &CategoryId,
    ) -> Result<bool, PreferenceRepositoryError> {
        let mut state = self.preferences()?;
        let before = state.preferences.len();
        state
            .preferences
            .retain(|stored| !(&stored.user_id == user_id && &stored.category_id == category_id));
        Ok(state.preferences.len() < before)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: PreferenceFilter,
    ) -> Result<Vec<Preference>, PreferenceRepositoryError> {
        let state = self.preferences()?;
        let mut listed: Vec<Preference> = state
            .preferences
            .iter()
            .filter(|stored| &stored.user_id == user_id)
            .filter(|stored| match filter {
                PreferenceFilter::All => true,
                PreferenceFilter::Category(category_id) => stored.category_id == category_id,
                PreferenceFilter::Level(level) => stored.level == level,
            })
            .filter_map(|stored| state.to_preference(stored))
            .collect();
        listed.sort_by(|a, b| a.category.as_ref().cmp(b.category.as_ref()));
        Ok(listed)
    }

    async fn users_with_level(
        &self,
        category_id: &CategoryId,
        level: PreferenceLevel,
    ) -> Result<Vec<User>, PreferenceRepositoryError> {
        let state = self.preferences()?;
        let mut users: Vec<User> = state
            .preferences
            .iter()
            .filter(|stored| &stored.category_id == category_id && stored.level == level)
            .filter_map(|stored| {
                state
                    .users
                    .iter()
                    .find(|account| account.user.id() == &stored.user_id)
                    .map(|account| account.user.clone())
            })
            .collect();
        users.sort_by(|a, b| a.name().as_ref().cmp(b.name().as_ref()));
        Ok(users)
    }
}

#[async_trait]
impl StoreProbe for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreProbeError> {
        self.lock().map(|_| ()).map_err(StoreProbeError::unreachable)
    }
}
