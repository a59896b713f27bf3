//! Classification of Diesel failures shared by the repositories.
//!
//! Each repository turns a [`StoreFailure`] into its own port error, so the
//! driver-specific inspection lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use super::pool::PoolError;

/// Category of a failed store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreFailureKind {
    Connection,
    Query,
    UniqueViolation,
    ForeignKeyViolation,
}

/// Classified store failure with a loggable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreFailure {
    pub kind: StoreFailureKind,
    pub message: String,
}

impl StoreFailure {
    fn new(kind: StoreFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<PoolError> for StoreFailure {
    fn from(error: PoolError) -> Self {
        warn!(%error, "database pool checkout failed");
        Self::new(StoreFailureKind::Connection, error.into_message())
    }
}

impl From<DieselError> for StoreFailure {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::DatabaseError(kind, info) => {
                let constraint = info.constraint_name().map(str::to_owned);
                debug!(?kind, message = info.message(), ?constraint, "diesel operation failed");
                let described = constraint.unwrap_or_else(|| info.message().to_owned());
                match kind {
                    DatabaseErrorKind::UniqueViolation => {
                        Self::new(StoreFailureKind::UniqueViolation, described)
                    }
                    DatabaseErrorKind::ForeignKeyViolation => {
                        Self::new(StoreFailureKind::ForeignKeyViolation, described)
                    }
                    DatabaseErrorKind::ClosedConnection => {
                        Self::new(StoreFailureKind::Connection, "database connection closed")
                    }
                    _ => Self::new(StoreFailureKind::Query, "database error"),
                }
            }
            DieselError::NotFound => Self::new(StoreFailureKind::Query, "record not found"),
            other => {
                debug!(error = %other, "diesel operation failed");
                Self::new(StoreFailureKind::Query, "database query error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct StubInfo {
        constraint: Option<&'static str>,
    }

    impl diesel::result::DatabaseErrorInformation for StubInfo {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(StubInfo { constraint }))
    }

    #[rstest]
    #[case(DatabaseErrorKind::UniqueViolation, StoreFailureKind::UniqueViolation)]
    #[case(DatabaseErrorKind::ForeignKeyViolation, StoreFailureKind::ForeignKeyViolation)]
    #[case(DatabaseErrorKind::ClosedConnection, StoreFailureKind::Connection)]
    #[case(DatabaseErrorKind::CheckViolation, StoreFailureKind::Query)]
    fn classifies_database_errors(
        #[case] kind: DatabaseErrorKind,
        #[case] expected: StoreFailureKind,
    ) {
        let failure = StoreFailure::from(database_error(kind, Some("some_constraint")));
        assert_eq!(failure.kind, expected);
    }

    #[rstest]
    fn constraint_name_is_preferred_as_message() {
        let failure = StoreFailure::from(database_error(
            DatabaseErrorKind::UniqueViolation,
            Some("users_email_key"),
        ));
        assert_eq!(failure.message, "users_email_key");
    }

    #[rstest]
    fn driver_message_is_used_without_constraint() {
        let failure =
            StoreFailure::from(database_error(DatabaseErrorKind::UniqueViolation, None));
        assert!(failure.message.contains("unique constraint"));
    }

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let failure = StoreFailure::from(PoolError::Checkout {
            message: "timed out".to_owned(),
        });
        assert_eq!(failure.kind, StoreFailureKind::Connection);
        assert_eq!(failure.message, "timed out");
    }
}
