//! Pool configuration

use crate::error::{PoolError, PoolResult};

/// Page size used when none is given
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Pages pre-allocated by the default configuration
pub const DEFAULT_INITIAL_PAGES: usize = 16;

/// Configuration for a block pool
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Size of every block handed out by the pool, in bytes
    pub page_size: usize,

    /// Pages allocated up front into the free set
    pub initial_pages: usize,

    /// Upper bound on owned pages (None for unbounded growth)
    pub max_pages: Option<usize>,

    /// Fill pattern byte written into a block when it is acquired (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte written into a block when it is released (for debugging)
    pub dealloc_pattern: Option<u8>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            initial_pages: DEFAULT_INITIAL_PAGES,
            max_pages: None,
            alloc_pattern: if cfg!(debug_assertions) {
                Some(0xBB)
            } else {
                None
            },
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
        }
    }
}

impl PoolConfig {
    /// Configuration for blocks of `page_size` bytes
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    /// Configuration for blocks sized to hold one `T`
    #[must_use]
    pub fn for_type<T>() -> Self {
        Self::new(core::mem::size_of::<T>().max(1))
    }

    /// Production configuration - no fill patterns
    #[must_use]
    pub fn production() -> Self {
        Self {
            alloc_pattern: None,
            dealloc_pattern: None,
            ..Default::default()
        }
    }

    /// Debug configuration - fill patterns on acquire and release
    #[must_use]
    pub fn debug() -> Self {
        Self {
            alloc_pattern: Some(0xBB),
            dealloc_pattern: Some(0xDD),
            ..Default::default()
        }
    }

    /// Set the block size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the number of pre-allocated pages
    pub fn with_initial_pages(mut self, initial_pages: usize) -> Self {
        self.initial_pages = initial_pages;
        self
    }

    /// Cap the number of pages the pool may own
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Set or clear both fill patterns
    pub fn with_patterns(mut self, alloc: Option<u8>, dealloc: Option<u8>) -> Self {
        self.alloc_pattern = alloc;
        self.dealloc_pattern = dealloc;
        self
    }

    /// Check the configuration can build a pool
    pub fn validate(&self) -> PoolResult<()> {
        if self.page_size == 0 {
            return Err(PoolError::invalid_config("page_size must be non-zero"));
        }

        if self.initial_pages > u32::MAX as usize {
            return Err(PoolError::invalid_config(
                "initial_pages exceeds the handle index range",
            ));
        }

        if let Some(max) = self.max_pages {
            if max == 0 {
                return Err(PoolError::invalid_config("max_pages must be non-zero"));
            }
            if self.initial_pages > max {
                return Err(PoolError::InvalidConfig {
                    reason: format!(
                        "initial_pages ({}) exceeds max_pages ({max})",
                        self.initial_pages
                    ),
                });
            }
        }

        Ok(())
    }
}
