//! Error types shared by the search engines, the repository and the reporter.

use thiserror::Error;

use super::memory::MemoryError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CarpError {
    #[error("not enough memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },

    #[error("item set report failed: {0}")]
    Report(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CarpError {
    pub fn report(message: impl Into<String>) -> Self {
        CarpError::Report(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        CarpError::InvalidArgument(message.into())
    }

    /// Error for a failed `try_reserve` of `count` values of type `T`.
    pub(crate) fn alloc_failed<T>(count: usize) -> Self {
        CarpError::OutOfMemory {
            requested: count.saturating_mul(std::mem::size_of::<T>()),
            available: 0,
        }
    }
}

impl From<MemoryError> for CarpError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::BudgetExceeded {
                requested,
                available,
            } => CarpError::OutOfMemory {
                requested,
                available,
            },
        }
    }
}

pub type CarpResult<T> = Result<T, CarpError>;
