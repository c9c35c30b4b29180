//! Storage held by one pool page

use crate::error::{PoolError, PoolResult};

/// Storage type of a single page
///
/// A pool creates one `Block` per page and keeps it for the pool's whole
/// lifetime; releasing a block only moves its page back to the free set.
///
/// # Example
/// ```
/// use lz_pool::{Block, Pool, PoolConfig, PoolResult};
///
/// #[derive(Default)]
/// struct Slot {
///     value: Option<u64>,
/// }
///
/// impl Block for Slot {
///     fn allocate(_page_size: usize) -> PoolResult<Self> {
///         Ok(Self::default())
///     }
///
///     fn reset(&mut self) {
///         self.value = None;
///     }
/// }
///
/// let mut pool: Pool<Slot> = Pool::with_config(PoolConfig::for_type::<Slot>()).unwrap();
/// let id = pool.acquire().unwrap();
/// pool.get_mut(id).unwrap().value = Some(7);
/// pool.release(id).unwrap();
/// ```
pub trait Block: Sized {
    /// Allocate storage for a fresh page
    ///
    /// Must report allocation failure as an error instead of aborting.
    fn allocate(page_size: usize) -> PoolResult<Self>;

    /// Reset to initial state
    ///
    /// Called when the block is released back to the free set.
    fn reset(&mut self) {}

    /// Overwrite the block with a debug fill pattern
    fn poison(&mut self, _pattern: u8) {}
}

impl Block for Box<[u8]> {
    fn allocate(page_size: usize) -> PoolResult<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(page_size)
            .map_err(|_| PoolError::allocation_failed(page_size))?;
        data.resize(page_size, 0);
        Ok(data.into_boxed_slice())
    }

    fn poison(&mut self, pattern: u8) {
        self.fill(pattern);
    }
}
