//! Error types for lz-pool
//!
//! Uses thiserror for the enum and a coarse [`ErrorKind`] so callers can
//! branch on the failure class without matching every variant.

use thiserror::Error;

// ============================================================================
// Error classification
// ============================================================================

/// Failure classes shared by the pool and everything built on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Growing the pool or allocating storage failed.
    AllocationFailure,
    /// The caller passed a value the operation cannot accept.
    InvalidArgument,
    /// A handle was used outside its contract: foreign, stale, or released twice.
    ContractViolation,
}

// ============================================================================
// Main Error Type
// ============================================================================

/// Block pool errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // --- Allocation Errors ---
    #[error("page allocation failed: {size} bytes")]
    AllocationFailed { size: usize },

    #[error("pool exhausted: {pages} pages allocated (limit: {limit})")]
    Exhausted { pages: usize, limit: usize },

    // --- Configuration Errors ---
    #[error("invalid pool configuration: {reason}")]
    InvalidConfig { reason: String },

    // --- Handle Errors ---
    #[error("block {index} was not acquired from this pool")]
    ForeignBlock { index: usize },

    #[error("block {index} is stale (handle generation {handle}, page generation {page})")]
    StaleBlock {
        index: usize,
        handle: u64,
        page: u64,
    },

    #[error("block {index} is not in use")]
    NotInUse { index: usize },
}

impl PoolError {
    /// Failure class of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AllocationFailed { .. } | Self::Exhausted { .. } => ErrorKind::AllocationFailure,
            Self::InvalidConfig { .. } => ErrorKind::InvalidArgument,
            Self::ForeignBlock { .. } | Self::StaleBlock { .. } | Self::NotInUse { .. } => {
                ErrorKind::ContractViolation
            }
        }
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AllocationFailed { .. } => "POOL:ALLOC:FAILED",
            Self::Exhausted { .. } => "POOL:ALLOC:EXHAUSTED",
            Self::InvalidConfig { .. } => "POOL:CONFIG:INVALID",
            Self::ForeignBlock { .. } => "POOL:HANDLE:FOREIGN",
            Self::StaleBlock { .. } => "POOL:HANDLE:STALE",
            Self::NotInUse { .. } => "POOL:HANDLE:NOT_IN_USE",
        }
    }

    /// True for errors raised by misuse of a block handle
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        self.kind() == ErrorKind::ContractViolation
    }

    // ------------------------------------------------------------------------
    // Convenience constructors
    // ------------------------------------------------------------------------

    /// Create allocation failed error
    pub fn allocation_failed(size: usize) -> Self {
        Self::AllocationFailed { size }
    }

    /// Create pool exhausted error
    pub fn exhausted(pages: usize, limit: usize) -> Self {
        Self::Exhausted { pages, limit }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for pool operations
pub type PoolResult<T> = core::result::Result<T, PoolError>;
