//! Pooled storage for elements and queue headers

use lz_pool::{Block, BlockId, PoolResult};

use crate::payload::Entry;

/// Storage behind an [`Element`](crate::Element)
///
/// `owner` is the back-reference to the queue header: `Some` exactly while
/// the node is linked, `None` after removal.
#[derive(Debug, Default)]
pub(crate) struct Node {
    pub(crate) owner: Option<BlockId>,
    pub(crate) prev: Option<BlockId>,
    pub(crate) next: Option<BlockId>,
    pub(crate) entry: Option<Entry>,
}

impl Node {
    pub(crate) fn detach(&mut self) {
        self.owner = None;
        self.prev = None;
        self.next = None;
    }
}

impl Block for Node {
    fn allocate(_page_size: usize) -> PoolResult<Self> {
        Ok(Self::default())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Storage behind a [`Queue`](crate::Queue): both ends and the element count
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Header {
    pub(crate) head: Option<BlockId>,
    pub(crate) tail: Option<BlockId>,
    pub(crate) len: usize,
}

impl Block for Header {
    fn allocate(_page_size: usize) -> PoolResult<Self> {
        Ok(Self::default())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
