//! Error types for lz-queue

use lz_pool::{ErrorKind, PoolError};
use thiserror::Error;

use crate::element::{Element, QueueId};

/// Queue errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Element or queue storage could not be allocated, or a pool invariant broke
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("{element} is not linked into any queue")]
    NotLinked { element: Element },

    #[error("{element} is still linked into {queue}")]
    StillLinked { element: Element, queue: QueueId },

    #[error("{element} belongs to {owner}, not {queue}")]
    WrongQueue {
        element: Element,
        owner: QueueId,
        queue: QueueId,
    },

    #[error("{element} was destroyed or comes from another element pool")]
    StaleElement { element: Element },

    #[error("element pool is borrowed by a payload read in progress")]
    PoolBusy,
}

impl QueueError {
    /// Failure class of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Pool(error) => error.kind(),
            Self::NotLinked { .. }
            | Self::StillLinked { .. }
            | Self::WrongQueue { .. }
            | Self::StaleElement { .. }
            | Self::PoolBusy => ErrorKind::ContractViolation,
        }
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pool(error) => error.code(),
            Self::NotLinked { .. } => "QUEUE:ELEMENT:NOT_LINKED",
            Self::StillLinked { .. } => "QUEUE:ELEMENT:STILL_LINKED",
            Self::WrongQueue { .. } => "QUEUE:ELEMENT:WRONG_QUEUE",
            Self::StaleElement { .. } => "QUEUE:ELEMENT:STALE",
            Self::PoolBusy => "QUEUE:POOL:BUSY",
        }
    }

    /// Map a pool error raised while resolving `element` to a queue error
    pub(crate) fn for_element(error: PoolError, element: Element) -> Self {
        if error.is_contract_violation() {
            Self::StaleElement { element }
        } else {
            Self::Pool(error)
        }
    }
}

/// Result type for queue operations
pub type QueueResult<T> = core::result::Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_keep_their_kind() {
        let error = QueueError::from(PoolError::exhausted(4, 4));
        assert_eq!(error.kind(), ErrorKind::AllocationFailure);
        assert_eq!(error.code(), "POOL:ALLOC:EXHAUSTED");
        assert_eq!(error.to_string(), PoolError::exhausted(4, 4).to_string());
    }

    #[test]
    fn busy_is_contract_violation() {
        assert_eq!(QueueError::PoolBusy.kind(), ErrorKind::ContractViolation);
    }
}
