//! Allocation error definitions.

use thiserror::Error;

/// Errors returned by allocation engine operations.
///
/// Every variant is a normal outcome of bad input or an unknown id. None of
/// them leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolingError {
    /// Seat count outside [4, 6] or passenger count outside [1, 6].
    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Identifier collides with a car in the same fleet or an existing journey.
    #[error("duplicate id {0}")]
    DuplicateId(u32),

    /// The referenced journey is unknown.
    #[error("journey {0} not found")]
    NotFound(u32),

    /// Non-positive or out-of-range identifier supplied by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for allocation operations.
pub type PoolingResult<T> = Result<T, PoolingError>;
