use crate::storage::StoreError;

/// Engine-level errors surfaced to the dispatch caller.
///
/// An empty eligible pool is deliberately not represented here: "no drivers"
/// is a valid `MatchOutcome`, not a failure.
#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Driver {0} is no longer available")]
    DriverUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, MatchingError>;
