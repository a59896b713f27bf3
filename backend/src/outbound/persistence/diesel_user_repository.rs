//! PostgreSQL-backed [`UserRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserAccount, UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, ExternalAccount, PasswordHash, User, UserId, UserName,
};

use super::error_mapping::{StoreFailure, StoreFailureKind};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of the account store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the shared pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_store_failure(failure: impl Into<StoreFailure>) -> UserPersistenceError {
    let StoreFailure { kind, message } = failure.into();
    match kind {
        StoreFailureKind::Connection => UserPersistenceError::connection(message),
        StoreFailureKind::UniqueViolation => UserPersistenceError::duplicate(message),
        StoreFailureKind::Query | StoreFailureKind::ForeignKeyViolation => {
            UserPersistenceError::query(message)
        }
    }
}

/// Rebuild a domain user from a row, rejecting rows that violate the
/// domain's invariants instead of panicking.
pub(crate) fn row_to_user(row: &UserRow) -> Result<User, UserPersistenceError> {
    let parsed_name = UserName::new(&row.name);
    let parsed_email = EmailAddress::new(&row.email);
    let parsed_account = row
        .external_account
        .as_deref()
        .map(ExternalAccount::new)
        .transpose();
    match (parsed_name, parsed_email, parsed_account) {
        (Ok(name), Ok(email), Ok(external_account)) => {
            Ok(User::new(UserId::from_uuid(row.id), name, email)
                .with_external_account(external_account))
        }
        (Err(error), _, _) | (_, Err(error), _) | (_, _, Err(error)) => {
            warn!(user_id = %row.id, %error, "stored user row failed validation");
            Err(UserPersistenceError::query(format!(
                "stored user {} is invalid: {error}",
                row.id
            )))
        }
    }
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let user = row_to_user(&row)?;
    Ok(UserAccount {
        user,
        password_hash: PasswordHash::new(row.password_hash),
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            password_hash: account.password_hash.as_str(),
            external_account: user.external_account().map(AsRef::as_ref),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_store_failure)
    }

    async fn find_by_name(
        &self,
        name: &UserName,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        let row: Option<UserRow> = users::table
            .filter(users::name.eq(name.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_store_failure)?;

        row.map(row_to_account).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_store_failure)?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn name_or_email_taken(
        &self,
        name: &UserName,
        email: &EmailAddress,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_store_failure)?;

        diesel::select(diesel::dsl::exists(
            users::table.filter(
                users::name
                    .eq(name.as_ref())
                    .or(users::email.eq(email.as_ref())),
            ),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_store_failure)
    }
}
