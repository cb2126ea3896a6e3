use mat_allocation_database::StoreError;

/// Errors reported by the allocation engine. Transport layers map
/// [`AllocationError::NotFound`] and [`AllocationError::BadRequest`] to their
/// own status codes, everything in [`AllocationError::Store`] is a server
/// fault.
#[derive(thiserror::Error, Debug)]
pub enum AllocationError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("store error: {0}")]
    Store(StoreError),
}

impl AllocationError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

// the engine owns every write it issues, so constraint failures become bad requests
impl From<StoreError> for AllocationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(message) => Self::BadRequest(message),
            StoreError::NotFound(message) => Self::NotFound(message),
            database @ StoreError::Database(_) => Self::Store(database),
        }
    }
}
