//! Element and queue handles

use core::fmt;

use lz_pool::BlockId;

/// Non-owning handle to one queue entry
///
/// Returned by `append`/`prepend` and the navigation methods. The entry is
/// owned by its queue (or, after removal, by the element pool until it is
/// destroyed); a handle kept past destruction is rejected as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element(pub(crate) BlockId);

impl Element {
    pub(crate) fn block(self) -> BlockId {
        self.0
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element #{}.{}", self.0.index(), self.0.generation())
    }
}

/// Identity of a queue within its element pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId(pub(crate) BlockId);

impl QueueId {
    pub(crate) fn block(self) -> BlockId {
        self.0
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue #{}.{}", self.0.index(), self.0.generation())
    }
}
