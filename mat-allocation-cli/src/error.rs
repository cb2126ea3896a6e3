use std::process::ExitCode;

use mat_allocation_config::ConfigError;
use mat_allocation_database::DatabaseError;
use mat_allocation_engine::AllocationError;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    Allocation(#[from] AllocationError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Not found is 4, a rejected request is 2, anything else is 1.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Allocation(AllocationError::NotFound(_)) => ExitCode::from(4),
            Self::Allocation(AllocationError::BadRequest(_)) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use mat_allocation_database::StoreError;

    use super::*;

    #[test]
    fn exit_codes() {
        let not_found = CliError::from(AllocationError::NotFound("id: Missing 1".into()));
        let bad_request = CliError::from(AllocationError::BadRequest("idTo: taken".into()));
        let store = CliError::from(AllocationError::Store(StoreError::NotFound(
            "id: Missing Registration 1".into(),
        )));
        assert_eq!(not_found.exit_code(), ExitCode::from(4));
        assert_eq!(bad_request.exit_code(), ExitCode::from(2));
        assert_eq!(store.exit_code(), ExitCode::FAILURE);
    }
}
