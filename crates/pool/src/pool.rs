//! Fixed-size block pool
//!
//! Pages live in an append-only table. A page is either in the free set (its
//! index sits on the free stack) or in the used set; `release` pushes onto the
//! free stack and `acquire` pops from it, so the most recently released block
//! is the first one handed out again.
//!
//! ## Invariants
//!
//! - `pages.len() == free.len() + used`, and `pages.len()` never decreases
//! - `free.capacity() >= pages.len()`, so `release` never allocates
//! - a page's generation changes every time it is released; a [`BlockId`]
//!   is valid only while its generation matches the page's

use core::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use crate::block::Block;
use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::stats::PoolStats;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to one acquired block
///
/// Handles are plain values: copying one does not copy the block, and a
/// handle kept after `release` is rejected as stale by every pool operation.
///
/// Pool ids and page generations are 64-bit counters, so neither repeats
/// within the lifetime of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId {
    pool: u64,
    index: u32,
    generation: u64,
}

impl BlockId {
    /// Page index inside the owning pool
    #[must_use]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation of the page when this handle was issued
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    Free,
    Used,
}

struct Page<B> {
    block: B,
    state: PageState,
    generation: u64,
}

/// Outcome of [`Pool::teardown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teardown {
    /// Pages released back to the system
    pub pages: usize,
    /// Blocks still acquired when the pool was torn down
    pub outstanding: usize,
}

/// Pool of uniformly sized blocks
///
/// Not thread-safe; callers serialize access to a pool instance.
///
/// # Example
/// ```
/// use lz_pool::RawPool;
///
/// let mut pool = RawPool::new(64, 4).unwrap();
/// let id = pool.acquire().unwrap();
/// pool.get_mut(id).unwrap()[0] = 1;
/// pool.release(id).unwrap();
///
/// // released blocks are reused before the pool grows
/// let again = pool.acquire().unwrap();
/// assert_eq!(again.index(), id.index());
/// ```
pub struct Pool<B: Block = Box<[u8]>> {
    id: u64,
    config: PoolConfig,
    pages: Vec<Page<B>>,
    free: Vec<u32>,
    used: usize,
    stats: PoolStats,
}

/// Pool of raw byte pages
pub type RawPool = Pool<Box<[u8]>>;

impl<B: Block> Pool<B> {
    /// Create a pool of `page_size` byte blocks with `initial_pages` pre-allocated
    pub fn new(page_size: usize, initial_pages: usize) -> PoolResult<Self> {
        Self::with_config(
            PoolConfig::new(page_size)
                .with_initial_pages(initial_pages)
                .with_patterns(None, None),
        )
    }

    /// Create pool with custom configuration
    ///
    /// All-or-nothing: if any initial page fails to allocate, the pages
    /// allocated so far are dropped and the error is returned.
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let mut pool = Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            pages: Vec::new(),
            free: Vec::new(),
            used: 0,
            stats: PoolStats::default(),
            config,
        };

        pool.pages
            .try_reserve_exact(pool.config.initial_pages)
            .map_err(|_| PoolError::allocation_failed(pool.config.page_size))?;

        for _ in 0..pool.config.initial_pages {
            let index = pool.allocate_page()?;
            pool.free.push(index);
        }
        // Hand out page 0 first.
        pool.free.reverse();

        debug!(
            pool = pool.id,
            page_size = pool.config.page_size,
            pages = pool.pages.len(),
            "block pool created"
        );

        Ok(pool)
    }

    /// Add one page to the table, reserving room for it on the free stack
    fn allocate_page(&mut self) -> PoolResult<u32> {
        let pages = self.pages.len();
        if let Some(limit) = self.config.max_pages {
            if pages >= limit {
                return Err(PoolError::exhausted(pages, limit));
            }
        }
        let index = u32::try_from(pages).map_err(|_| PoolError::exhausted(pages, pages))?;

        let size = self.config.page_size;
        self.pages
            .try_reserve(1)
            .map_err(|_| PoolError::allocation_failed(size))?;
        self.free
            .try_reserve(pages + 1 - self.free.len())
            .map_err(|_| PoolError::allocation_failed(size))?;

        let block = B::allocate(size)?;
        self.pages.push(Page {
            block,
            state: PageState::Free,
            generation: 0,
        });

        Ok(index)
    }

    /// Take a block from the free set, growing by exactly one page if it is empty
    pub fn acquire(&mut self) -> PoolResult<BlockId> {
        let (index, reused) = match self.free.pop() {
            Some(index) => (index, true),
            None => {
                let index = self.allocate_page()?;
                trace!(pool = self.id, pages = self.pages.len(), "block pool grew");
                (index, false)
            }
        };

        let page = &mut self.pages[index as usize];
        page.state = PageState::Used;
        if let Some(pattern) = self.config.alloc_pattern {
            page.block.poison(pattern);
        }
        let generation = page.generation;

        self.used += 1;
        self.stats.record_acquire(reused);

        Ok(BlockId {
            pool: self.id,
            index,
            generation,
        })
    }

    /// Acquire a block and borrow it in one step
    pub fn acquire_mut(&mut self) -> PoolResult<(BlockId, &mut B)> {
        let id = self.acquire()?;
        Ok((id, &mut self.pages[id.index()].block))
    }

    /// Return a block to the free set
    ///
    /// `id` must come from `acquire` on this pool and must not have been
    /// released since. Violations are reported as contract-violation errors
    /// and leave the pool unchanged.
    pub fn release(&mut self, id: BlockId) -> PoolResult<()> {
        let index = self.locate(id)?;
        let dealloc_pattern = self.config.dealloc_pattern;

        let page = &mut self.pages[index];
        page.block.reset();
        if let Some(pattern) = dealloc_pattern {
            page.block.poison(pattern);
        }
        page.state = PageState::Free;
        page.generation += 1;

        self.free.push(id.index);
        self.used -= 1;
        self.stats.record_release();

        Ok(())
    }

    /// Release an optional handle; `None` is a no-op
    pub fn release_opt(&mut self, id: Option<BlockId>) -> PoolResult<()> {
        id.map_or(Ok(()), |id| self.release(id))
    }

    /// Borrow an acquired block
    pub fn get(&self, id: BlockId) -> PoolResult<&B> {
        let index = self.locate(id)?;
        Ok(&self.pages[index].block)
    }

    /// Mutably borrow an acquired block
    pub fn get_mut(&mut self, id: BlockId) -> PoolResult<&mut B> {
        let index = self.locate(id)?;
        Ok(&mut self.pages[index].block)
    }

    /// True while `id` refers to a block acquired from this pool and not yet released
    pub fn is_in_use(&self, id: BlockId) -> bool {
        self.locate(id).is_ok()
    }

    fn locate(&self, id: BlockId) -> PoolResult<usize> {
        let index = id.index();
        if id.pool != self.id {
            return Err(PoolError::ForeignBlock { index });
        }
        let Some(page) = self.pages.get(index) else {
            return Err(PoolError::ForeignBlock { index });
        };
        if page.generation != id.generation {
            return Err(PoolError::StaleBlock {
                index,
                handle: id.generation,
                page: page.generation,
            });
        }
        if page.state != PageState::Used {
            return Err(PoolError::NotInUse { index });
        }
        Ok(index)
    }

    /// Block size in bytes
    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Pages owned by the pool
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Pages in the free set
    pub fn free_pages(&self) -> usize {
        self.free.len()
    }

    /// Pages in the used set
    pub fn used_pages(&self) -> usize {
        self.used
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Operation counters
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Release every page and report how many blocks were still acquired
    ///
    /// Outstanding handles become foreign to every other pool, so they cannot
    /// be misused after teardown.
    pub fn teardown(self) -> Teardown {
        let report = Teardown {
            pages: self.pages.len(),
            outstanding: self.used,
        };
        if report.outstanding > 0 {
            warn!(
                pool = self.id,
                outstanding = report.outstanding,
                "block pool torn down with blocks still in use"
            );
        } else {
            debug!(pool = self.id, pages = report.pages, "block pool torn down");
        }
        report
    }
}

impl<B: Block> core::fmt::Debug for Pool<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("page_size", &self.config.page_size)
            .field("total_pages", &self.pages.len())
            .field("free_pages", &self.free.len())
            .field("used_pages", &self.used)
            .finish()
    }
}
