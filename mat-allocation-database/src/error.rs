use diesel::result::DatabaseErrorKind;
use diesel_async::pooled_connection::deadpool;
use thiserror::Error;

use crate::models::{GuestId, RegistrationId};

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to create database pool {0}")]
    PoolBuild(#[from] deadpool::BuildError),
    #[error("Database pool failed {0}")]
    Pool(#[from] deadpool::PoolError),
    #[error("Database query failed {0}")]
    Database(#[from] diesel::result::Error),
}

/// Errors of the persistence contract.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A field-level constraint failed: unique index, foreign key, not null
    /// or check constraint.
    #[error("{0}")]
    Validation(String),
    /// The row addressed by an update or delete does not exist.
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl StoreError {
    pub(crate) fn missing_registration(id: RegistrationId) -> Self {
        Self::NotFound(format!("id: Missing Registration {id}"))
    }

    /// An assignment write found the row holding `current` instead of the
    /// guest it was prepared against.
    pub(crate) fn stale_assignment(id: RegistrationId, current: Option<GuestId>) -> Self {
        Self::Validation(if current.is_some() {
            format!("id: Registration {id} is already assigned to someone else")
        } else {
            format!("id: Registration {id} is not currently assigned")
        })
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation,
                info,
            ) => Self::Validation(
                match info.column_name().or_else(|| info.constraint_name()) {
                    Some(field) => format!("{field}: {}", info.message()),
                    None => info.message().to_owned(),
                },
            ),
            other => Self::Database(DatabaseError::Database(other)),
        }
    }
}

impl From<deadpool::PoolError> for StoreError {
    fn from(value: deadpool::PoolError) -> Self {
        Self::Database(value.into())
    }
}
