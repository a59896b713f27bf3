//! PostgreSQL-backed [`PreferenceRepository`].
//!
//! Categories are upserted with `ON CONFLICT DO NOTHING` followed by a
//! select, so concurrent first writes of a new category converge on one row.
//! The composite unique constraint on `(user_id, category_id)` and the
//! foreign keys surface as `Duplicate` and `InvalidReference` errors.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{PreferenceFilter, PreferenceRepository, PreferenceRepositoryError};
use crate::domain::{
    Category, CategoryId, CategoryName, Preference, PreferenceId, PreferenceLevel, User, UserId,
};

use super::diesel_user_repository::row_to_user;
use super::error_mapping::{StoreFailure, StoreFailureKind};
use super::models::{
    CategoryRow, NewCategoryRow, NewPreferenceRow, PreferenceLevelUpdate, PreferenceRow, UserRow,
};
use super::pool::DbPool;
use super::schema::{categories, preferences, users};

/// Diesel implementation of the preference store.
#[derive(Clone)]
pub struct DieselPreferenceRepository {
    pool: DbPool,
}

impl DieselPreferenceRepository {
    /// Create a repository over the shared pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_store_failure(failure: impl Into<StoreFailure>) -> PreferenceRepositoryError {
    let StoreFailure { kind, message } = failure.into();
    match kind {
        StoreFailureKind::Connection => PreferenceRepositoryError::connection(message),
        StoreFailureKind::Query => PreferenceRepositoryError::query(message),
        StoreFailureKind::UniqueViolation => PreferenceRepositoryError::duplicate(message),
        StoreFailureKind::ForeignKeyViolation => {
            PreferenceRepositoryError::invalid_reference(message)
        }
    }
}

fn level_to_db(level: PreferenceLevel) -> i16 {
    i16::from(level.value())
}

fn level_from_db(
    raw: i16,
    preference_id: Uuid,
) -> Result<PreferenceLevel, PreferenceRepositoryError> {
    PreferenceLevel::new(i64::from(raw)).map_err(|error| {
        warn!(%preference_id, raw, "stored preference level out of range");
        PreferenceRepositoryError::query(format!("stored preference {preference_id}: {error}"))
    })
}

fn category_from_db(raw: &str) -> Result<CategoryName, PreferenceRepositoryError> {
    CategoryName::new(raw).map_err(|error| {
        warn!(category = raw, "stored category name failed validation");
        PreferenceRepositoryError::query(format!("stored category {raw:?}: {error}"))
    })
}

fn row_to_category(row: CategoryRow) -> Result<Category, PreferenceRepositoryError> {
    Ok(Category {
        id: CategoryId::from_uuid(row.id),
        name: category_from_db(&row.name)?,
    })
}

fn row_to_preference(
    row: &PreferenceRow,
    category: CategoryName,
) -> Result<Preference, PreferenceRepositoryError> {
    Ok(Preference {
        id: PreferenceId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        category,
        level: level_from_db(row.level, row.id)?,
    })
}

#[async_trait]
impl PreferenceRepository for DieselPreferenceRepository {
    async fn find_category(
        &self,
        name: &CategoryName,
    ) -> Result<Option<Category>, PreferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        let row: Option<CategoryRow> = categories::table
            .filter(categories::name.eq(name.as_ref()))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_store_failure)?;

        row.map(row_to_category).transpose()
    }

    async fn find_or_create_category(
        &self,
        name: &CategoryName,
    ) -> Result<Category, PreferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        diesel::insert_into(categories::table)
            .values(&NewCategoryRow {
                id: Uuid::new_v4(),
                name: name.as_ref(),
            })
            .on_conflict(categories::name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_store_failure)?;

        let row: CategoryRow = categories::table
            .filter(categories::name.eq(name.as_ref()))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_store_failure)?;

        row_to_category(row)
    }

    async fn insert(
        &self,
        preference: &Preference,
        category_id: &CategoryId,
    ) -> Result<(), PreferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        diesel::insert_into(preferences::table)
            .values(&NewPreferenceRow {
                id: *preference.id.as_uuid(),
                user_id: *preference.user_id.as_uuid(),
                category_id: *category_id.as_uuid(),
                level: level_to_db(preference.level),
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_store_failure)
    }

    async fn update_level(
        &self,
        user_id: &UserId,
        category: &Category,
        level: PreferenceLevel,
    ) -> Result<Option<Preference>, PreferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        let row: Option<PreferenceRow> = diesel::update(
            preferences::table
                .filter(preferences::user_id.eq(user_id.as_uuid()))
                .filter(preferences::category_id.eq(category.id.as_uuid())),
        )
        .set(&PreferenceLevelUpdate {
            level: level_to_db(level),
            updated_at: Utc::now(),
        })
        .returning(PreferenceRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_store_failure)?;

        row.map(|updated| row_to_preference(&updated, category.name.clone()))
            .transpose()
    }

    async fn delete(
        &self,
        user_id: &UserId,
        category_id: &CategoryId,
    ) -> Result<bool, PreferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        let deleted = diesel::delete(
            preferences::table
                .filter(preferences::user_id.eq(user_id.as_uuid()))
                .filter(preferences::category_id.eq(category_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_store_failure)?;

        Ok(deleted > 0)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        filter: PreferenceFilter,
    ) -> Result<Vec<Preference>, PreferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        let mut query = preferences::table
            .inner_join(categories::table)
            .filter(preferences::user_id.eq(*user_id.as_uuid()))
            .select((PreferenceRow::as_select(), categories::name))
            .order(categories::name.asc())
            .into_boxed();
        query = match filter {
            PreferenceFilter::All => query,
            PreferenceFilter::Category(category_id) => {
                query.filter(preferences::category_id.eq(*category_id.as_uuid()))
            }
            PreferenceFilter::Level(level) => {
                query.filter(preferences::level.eq(level_to_db(level)))
            }
        };

        let rows: Vec<(PreferenceRow, String)> =
            query.load(&mut conn).await.map_err(map_store_failure)?;

        rows.iter()
            .map(|(row, category)| row_to_preference(row, category_from_db(category)?))
            .collect()
    }

    async fn users_with_level(
        &self,
        category_id: &CategoryId,
        level: PreferenceLevel,
    ) -> Result<Vec<User>, PreferenceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        let rows: Vec<UserRow> = users::table
            .inner_join(preferences::table)
            .filter(preferences::category_id.eq(category_id.as_uuid()))
            .filter(preferences::level.eq(level_to_db(level)))
            .select(UserRow::as_select())
            .order(users::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_store_failure)?;

        rows.iter()
            .map(|row| {
                row_to_user(row)
                    .map_err(|error| PreferenceRepositoryError::query(error.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StoreFailureKind::UniqueViolation, "duplicate")]
    #[case(StoreFailureKind::ForeignKeyViolation, "invalid_reference")]
    #[case(StoreFailureKind::Connection, "connection")]
    #[case(StoreFailureKind::Query, "query")]
    fn store_failures_map_to_port_errors(#[case] kind: StoreFailureKind, #[case] expected: &str) {
        let error = map_store_failure(StoreFailure {
            kind,
            message: "preferences_user_id_category_id_key".to_owned(),
        });
        let actual = match error {
            PreferenceRepositoryError::Duplicate { .. } => "duplicate",
            PreferenceRepositoryError::InvalidReference { .. } => "invalid_reference",
            PreferenceRepositoryError::Connection { .. } => "connection",
            PreferenceRepositoryError::Query { .. } => "query",
        };
        assert_eq!(actual, expected);
    }

    #[rstest]
    fn out_of_range_levels_are_query_errors() {
        let error = level_from_db(0, Uuid::nil()).expect_err("level zero is invalid");
        assert!(matches!(error, PreferenceRepositoryError::Query { .. }));
    }

    #[rstest]
    fn preference_rows_keep_category_and_level() {
        let row = PreferenceRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            level: 4,
        };
        let category = CategoryName::new("drama").expect("category");
        let preference = row_to_preference(&row, category.clone()).expect("valid row");
        assert_eq!(preference.category, category);
        assert_eq!(preference.level.value(), 4);
        assert_eq!(preference.user_id, UserId::from_uuid(row.user_id));
    }
}
