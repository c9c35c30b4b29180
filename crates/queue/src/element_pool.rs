//! Element pool shared by queues
//!
//! # Ownership
//!
//! An [`ElementPool`] is a cheap, cloneable `Rc` handle to one
//! arena holding two block pools: one for element nodes and one for queue
//! headers. Every [`Queue`](crate::Queue) keeps a clone, so the arena lives
//! as long as its last queue. The handle is `!Send` and `!Sync`: one pool
//! serves exactly one thread.
//!
//! ## Borrowing
//!
//! - No mutable borrow is held while user code runs (destructors, `foreach`
//!   callbacks), so both may call back into any queue of the same pool
//! - `Queue::with_payload` holds a shared borrow for the duration of its
//!   closure; mutations attempted from inside it fail with
//!   `QueueError::PoolBusy`, and a queue dropped inside it is torn down as
//!   soon as the closure returns

use core::cell::{Ref, RefCell, RefMut};
use core::fmt;
use std::rc::Rc;

use lz_pool::{Pool, PoolConfig, PoolStats};
use tracing::{debug, trace, warn};

use crate::element::{Element, QueueId};
use crate::error::{QueueError, QueueResult};
use crate::node::{Header, Node};
use crate::payload::Entry;

/// Element pages pre-allocated by [`ElementPool::new`]
pub const DEFAULT_ELEMENT_PAGES: usize = 1024;

thread_local! {
    static THREAD_POOL: RefCell<Option<ElementPool>> = const { RefCell::new(None) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum End {
    Head,
    Tail,
}

pub(crate) struct Arena {
    nodes: Pool<Node>,
    headers: Pool<Header>,
}

impl Arena {
    pub(crate) fn node(&self, element: Element) -> QueueResult<&Node> {
        self.nodes
            .get(element.block())
            .map_err(|error| QueueError::for_element(error, element))
    }

    fn node_mut(&mut self, element: Element) -> QueueResult<&mut Node> {
        self.nodes
            .get_mut(element.block())
            .map_err(|error| QueueError::for_element(error, element))
    }

    pub(crate) fn header(&self, queue: QueueId) -> QueueResult<&Header> {
        Ok(self.headers.get(queue.block())?)
    }

    /// Node of `element` if it is currently linked into `queue`
    pub(crate) fn member(&self, queue: QueueId, element: Element) -> Option<&Node> {
        self.nodes
            .get(element.block())
            .ok()
            .filter(|node| node.owner == Some(queue.block()))
    }

    pub(crate) fn check_member(&self, queue: QueueId, element: Element) -> QueueResult<()> {
        match self.node(element)?.owner {
            Some(owner) if owner == queue.block() => Ok(()),
            Some(owner) => Err(QueueError::WrongQueue {
                element,
                owner: QueueId(owner),
                queue,
            }),
            None => Err(QueueError::NotLinked { element }),
        }
    }

    pub(crate) fn create_queue(&mut self) -> QueueResult<QueueId> {
        Ok(QueueId(self.headers.acquire()?))
    }

    pub(crate) fn release_queue(&mut self, queue: QueueId) -> QueueResult<()> {
        Ok(self.headers.release(queue.block())?)
    }

    /// Link a new node carrying `entry` at one end of `queue`
    ///
    /// On failure the entry is handed back untouched.
    pub(crate) fn link(
        &mut self,
        queue: QueueId,
        end: End,
        entry: Entry,
    ) -> Result<Element, (QueueError, Entry)> {
        let mut header = match self.header(queue) {
            Ok(header) => *header,
            Err(error) => return Err((error, entry)),
        };
        let neighbour = match end {
            End::Head => header.head,
            End::Tail => header.tail,
        };
        if let Some(neighbour) = neighbour {
            if let Err(error) = self.nodes.get(neighbour) {
                return Err((error.into(), entry));
            }
        }

        let (id, node) = match self.nodes.acquire_mut() {
            Ok(acquired) => acquired,
            Err(error) => return Err((error.into(), entry)),
        };
        *node = Node {
            owner: Some(queue.block()),
            prev: if end == End::Tail { neighbour } else { None },
            next: if end == End::Head { neighbour } else { None },
            entry: Some(entry),
        };

        // Neighbour and header were resolved above; the lookups cannot fail here.
        match neighbour {
            Some(neighbour) => {
                if let Ok(other) = self.nodes.get_mut(neighbour) {
                    match end {
                        End::Head => other.prev = Some(id),
                        End::Tail => other.next = Some(id),
                    }
                }
            }
            None => {
                header.head = Some(id);
                header.tail = Some(id);
            }
        }
        match end {
            End::Head => header.head = Some(id),
            End::Tail => header.tail = Some(id),
        }
        header.len += 1;
        if let Ok(slot) = self.headers.get_mut(queue.block()) {
            *slot = header;
        }

        Ok(Element(id))
    }

    /// Unlink `element` from whichever queue owns it
    pub(crate) fn unlink(&mut self, element: Element) -> QueueResult<QueueId> {
        let node = self.node(element)?;
        let owner = node.owner.ok_or(QueueError::NotLinked { element })?;
        let (prev, next) = (node.prev, node.next);

        let queue = QueueId(owner);
        let mut header = *self.header(queue)?;
        match prev {
            Some(prev) => self.nodes.get_mut(prev)?.next = next,
            None => header.head = next,
        }
        match next {
            Some(next) => self.nodes.get_mut(next)?.prev = prev,
            None => header.tail = prev,
        }
        header.len -= 1;
        *self.headers.get_mut(queue.block())? = header;

        self.node_mut(element)?.detach();
        Ok(queue)
    }

    /// Free an unlinked element's node and hand back its entry for disposal
    pub(crate) fn take_unlinked(&mut self, element: Element) -> QueueResult<Option<Entry>> {
        let node = self.node_mut(element)?;
        if let Some(owner) = node.owner {
            return Err(QueueError::StillLinked {
                element,
                queue: QueueId(owner),
            });
        }
        let entry = node.entry.take();
        self.nodes
            .release(element.block())
            .map_err(|error| QueueError::for_element(error, element))?;
        Ok(entry)
    }

    /// Remove-then-destroy as one step
    pub(crate) fn discard(&mut self, queue: QueueId, element: Element) -> QueueResult<Option<Entry>> {
        self.check_member(queue, element)?;
        self.unlink(element)?;
        self.take_unlinked(element)
    }
}

/// Shared source of element storage for queues
///
/// # Example
/// ```
/// use lz_queue::{ElementPool, Queue};
///
/// let pool = ElementPool::with_capacity(64)?;
/// let mut jobs = Queue::with_pool(&pool)?;
/// let mut done = Queue::with_pool(&pool)?;
///
/// let job = jobs.append("compile")?;
/// pool.remove(job)?;
/// pool.destroy(job)?;
///
/// done.append("link")?;
/// assert_eq!(pool.in_use(), 1);
/// # Ok::<(), lz_queue::QueueError>(())
/// ```
#[derive(Clone)]
pub struct ElementPool {
    inner: Rc<Shared>,
}

struct Shared {
    arena: RefCell<Arena>,
    /// Queues dropped while the arena was borrowed, awaiting teardown
    orphans: RefCell<Vec<QueueId>>,
}

impl ElementPool {
    /// Create a pool with [`DEFAULT_ELEMENT_PAGES`] elements pre-allocated
    pub fn new() -> QueueResult<Self> {
        Self::with_capacity(DEFAULT_ELEMENT_PAGES)
    }

    /// Create a pool with `elements` pre-allocated
    pub fn with_capacity(elements: usize) -> QueueResult<Self> {
        Self::with_config(PoolConfig::for_type::<Node>().with_initial_pages(elements))
    }

    /// Create pool with custom configuration
    ///
    /// `initial_pages` and `max_pages` bound the element storage. `page_size`
    /// is informational: each page holds exactly one element node.
    pub fn with_config(config: PoolConfig) -> QueueResult<Self> {
        let nodes = Pool::with_config(config)?;
        let headers = Pool::with_config(PoolConfig::for_type::<Header>().with_initial_pages(0))?;

        Ok(Self {
            inner: Rc::new(Shared {
                arena: RefCell::new(Arena { nodes, headers }),
                orphans: RefCell::new(Vec::new()),
            }),
        })
    }

    /// The calling thread's default pool, created on first use
    ///
    /// A failed creation is not cached; the next call tries again.
    pub fn thread_local() -> QueueResult<Self> {
        THREAD_POOL.with(|slot| {
            let mut slot = slot.borrow_mut();
            if let Some(pool) = slot.as_ref() {
                return Ok(pool.clone());
            }

            let pool = Self::new()?;
            debug!(
                elements = DEFAULT_ELEMENT_PAGES,
                "created thread-local element pool"
            );
            *slot = Some(pool.clone());
            Ok(pool)
        })
    }

    /// True when both handles refer to the same pool
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn arena(&self) -> Ref<'_, Arena> {
        self.inner.arena.borrow()
    }

    pub(crate) fn arena_mut(&self) -> QueueResult<RefMut<'_, Arena>> {
        self.inner
            .arena
            .try_borrow_mut()
            .map_err(|_| QueueError::PoolBusy)
    }

    /// Destroy every element of `queue` head to tail, then release its header
    ///
    /// The arena is borrowed only between destructor calls.
    pub(crate) fn close_queue(&self, queue: QueueId) -> QueueResult<()> {
        loop {
            let entry = {
                let mut arena = self.arena_mut()?;
                let Some(head) = arena.header(queue)?.head else {
                    break;
                };
                arena.discard(queue, Element(head))?
            };
            if let Some(entry) = entry {
                entry.dispose();
            }
        }
        self.arena_mut()?.release_queue(queue)
    }

    /// Queue `queue` for teardown once the arena is free again
    pub(crate) fn defer_close(&self, queue: QueueId) {
        trace!(queue = %queue, "queue teardown deferred until payload read ends");
        self.inner.orphans.borrow_mut().push(queue);
    }

    /// Tear down queues dropped while the arena was borrowed
    pub(crate) fn reap(&self) {
        loop {
            let Some(queue) = self.inner.orphans.borrow_mut().pop() else {
                break;
            };
            match self.close_queue(queue) {
                Ok(()) => {}
                Err(QueueError::PoolBusy) => {
                    self.inner.orphans.borrow_mut().push(queue);
                    break;
                }
                Err(error) => warn!(queue = %queue, %error, "deferred queue teardown failed"),
            }
        }
    }

    /// Unlink `element` from its owning queue in O(1)
    ///
    /// Returns the queue it was removed from. Fails with
    /// [`QueueError::NotLinked`] when the element has no owner; no count
    /// changes in that case.
    pub fn remove(&self, element: Element) -> QueueResult<QueueId> {
        self.arena_mut()?.unlink(element)
    }

    /// Run the payload destructor and return the element's storage to the free set
    ///
    /// The element must have been removed first ([`QueueError::StillLinked`]
    /// otherwise). Destroying twice fails with [`QueueError::StaleElement`].
    pub fn destroy(&self, element: Element) -> QueueResult<()> {
        let entry = self.arena_mut()?.take_unlinked(element)?;
        if let Some(entry) = entry {
            entry.dispose();
        }
        Ok(())
    }

    /// Queue currently owning `element`, if any
    pub fn owner(&self, element: Element) -> Option<QueueId> {
        self.arena().node(element).ok()?.owner.map(QueueId)
    }

    /// True until `element` is destroyed
    pub fn is_live(&self, element: Element) -> bool {
        self.arena().node(element).is_ok()
    }

    /// Element storage owned by the pool
    pub fn capacity(&self) -> usize {
        self.arena().nodes.total_pages()
    }

    /// Element storage ready for reuse
    pub fn available(&self) -> usize {
        self.arena().nodes.free_pages()
    }

    /// Elements not yet destroyed, linked or not
    pub fn in_use(&self) -> usize {
        self.arena().nodes.used_pages()
    }

    /// Element storage counters
    pub fn stats(&self) -> PoolStats {
        self.arena().nodes.stats()
    }
}

impl fmt::Debug for ElementPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.arena.try_borrow() {
            Ok(arena) => f
                .debug_struct("ElementPool")
                .field("elements", &arena.nodes)
                .field("queues", &arena.headers.used_pages())
                .finish(),
            Err(_) => f.write_str("ElementPool { <borrowed> }"),
        }
    }
}
