//! # lz-pool
//!
//! Fixed-size block pool: hands out and reclaims uniformly sized blocks
//! without a system allocation per request.
//!
//! - Pages are allocated up front or one at a time when the free set runs dry
//! - Released blocks go back to the free set; the pool never shrinks
//! - Blocks are addressed by [`BlockId`] handles carrying a generation, so a
//!   foreign, stale or double-released handle is an error instead of
//!   corrupting the free/used partition
//!
//! ## Quick Start
//!
//! ```rust
//! use lz_pool::{PoolConfig, RawPool};
//!
//! let mut pool = RawPool::with_config(PoolConfig::new(256).with_initial_pages(8))?;
//! let block = pool.acquire()?;
//! pool.get_mut(block)?[..5].copy_from_slice(b"hello");
//! pool.release(block)?;
//! # Ok::<(), lz_pool::PoolError>(())
//! ```
//!
//! The pool stores any [`Block`] type; `Box<[u8]>` gives raw byte pages
//! ([`RawPool`]), and higher layers implement `Block` for their node types.

mod block;
mod config;
mod error;
mod pool;
mod stats;

pub use block::Block;
pub use config::{DEFAULT_INITIAL_PAGES, DEFAULT_PAGE_SIZE, PoolConfig};
pub use error::{ErrorKind, PoolError, PoolResult};
pub use pool::{BlockId, Pool, RawPool, Teardown};
pub use stats::PoolStats;
