//! Doubly-linked queue over pooled elements

use core::fmt;
use core::ops::ControlFlow;

use tracing::{trace, warn};

use crate::element::{Element, QueueId};
use crate::element_pool::{ElementPool, End};
use crate::error::{QueueError, QueueResult};
use crate::iter::Iter;
use crate::payload::{Entry, Payload};

/// Ordered sequence of payload-carrying elements
///
/// Insertion at either end and removal of any element are O(1). Element
/// storage comes from an [`ElementPool`]: the calling thread's default pool
/// for [`Queue::new`], or an explicit one for [`Queue::with_pool`].
///
/// Dropping a queue destroys every remaining element, running payload
/// destructors in head-to-tail order. [`Queue::destroy`] does the same but
/// reports failures instead of logging them.
///
/// # Example
/// ```
/// use lz_queue::Queue;
///
/// let mut queue = Queue::new()?;
/// queue.append("b")?;
/// queue.append("c")?;
/// queue.prepend("a")?;
///
/// assert_eq!(queue.payloads(), [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
/// queue.destroy()?;
/// # Ok::<(), lz_queue::QueueError>(())
/// ```
pub struct Queue {
    pool: ElementPool,
    id: QueueId,
    released: bool,
}

impl Queue {
    /// Create an empty queue backed by the thread-local element pool
    pub fn new() -> QueueResult<Self> {
        Self::with_pool(&ElementPool::thread_local()?)
    }

    /// Create an empty queue backed by `pool`
    pub fn with_pool(pool: &ElementPool) -> QueueResult<Self> {
        let id = pool.arena_mut()?.create_queue()?;
        trace!(queue = %id, "queue created");

        Ok(Self {
            pool: pool.clone(),
            id,
            released: false,
        })
    }

    /// Identity of this queue within its pool
    pub fn id(&self) -> QueueId {
        self.id
    }

    /// Pool providing element storage
    pub fn pool(&self) -> &ElementPool {
        &self.pool
    }

    // ---- insertion ----

    /// Insert a payload at the tail
    ///
    /// The payload is dropped normally when the element is destroyed. On
    /// failure it is dropped before the error is returned.
    pub fn append(&mut self, payload: impl Into<Payload>) -> QueueResult<Element> {
        self.insert(End::Tail, Entry::new(payload.into()))
    }

    /// Insert a payload at the tail with an explicit length and release action
    ///
    /// `destructor` runs exactly once when the element is destroyed, unless
    /// the payload is [`Payload::Empty`]. On failure it runs before the error
    /// is returned, so the payload is never leaked.
    pub fn append_with<F>(
        &mut self,
        payload: impl Into<Payload>,
        len: usize,
        destructor: F,
    ) -> QueueResult<Element>
    where
        F: FnOnce(Payload) + 'static,
    {
        let entry = Entry::with_destructor(payload.into(), len, Box::new(destructor));
        self.insert(End::Tail, entry)
    }

    /// Insert a payload at the head
    pub fn prepend(&mut self, payload: impl Into<Payload>) -> QueueResult<Element> {
        self.insert(End::Head, Entry::new(payload.into()))
    }

    /// Insert a payload at the head with an explicit length and release action
    pub fn prepend_with<F>(
        &mut self,
        payload: impl Into<Payload>,
        len: usize,
        destructor: F,
    ) -> QueueResult<Element>
    where
        F: FnOnce(Payload) + 'static,
    {
        let entry = Entry::with_destructor(payload.into(), len, Box::new(destructor));
        self.insert(End::Head, entry)
    }

    fn insert(&mut self, end: End, entry: Entry) -> QueueResult<Element> {
        let linked = match self.pool.arena_mut() {
            Ok(mut arena) => arena.link(self.id, end, entry),
            Err(error) => Err((error, entry)),
        };

        linked.map_err(|(error, entry)| {
            warn!(queue = %self.id, %error, "insert failed, releasing payload");
            entry.dispose();
            error
        })
    }

    // ---- removal ----

    /// Unlink `element` from this queue without destroying it
    ///
    /// The element stays alive until [`ElementPool::destroy`]. Fails with
    /// [`QueueError::WrongQueue`] when another queue owns it and with
    /// [`QueueError::NotLinked`] when no queue does.
    pub fn remove(&mut self, element: Element) -> QueueResult<()> {
        let mut arena = self.pool.arena_mut()?;
        arena.check_member(self.id, element)?;
        arena.unlink(element)?;
        Ok(())
    }

    /// Unlink `element` and destroy it in one step
    pub fn remove_and_destroy(&mut self, element: Element) -> QueueResult<()> {
        let entry = self.pool.arena_mut()?.discard(self.id, element)?;
        if let Some(entry) = entry {
            entry.dispose();
        }
        Ok(())
    }

    /// Destroy every element, leaving the queue empty and usable
    ///
    /// Destructors run head to tail. Elements appended by a destructor are
    /// destroyed as well.
    pub fn clear(&mut self) -> QueueResult<()> {
        while let Some(first) = self.first() {
            self.remove_and_destroy(first)?;
        }
        Ok(())
    }

    /// Destroy every element and release the queue's own storage
    pub fn destroy(mut self) -> QueueResult<()> {
        self.close()
    }

    fn close(&mut self) -> QueueResult<()> {
        if self.released {
            return Ok(());
        }
        self.pool.close_queue(self.id)?;
        self.released = true;
        trace!(queue = %self.id, "queue destroyed");
        Ok(())
    }

    // ---- navigation ----

    /// Head element
    pub fn first(&self) -> Option<Element> {
        self.pool.arena().header(self.id).ok()?.head.map(Element)
    }

    /// Tail element
    pub fn last(&self) -> Option<Element> {
        self.pool.arena().header(self.id).ok()?.tail.map(Element)
    }

    /// Successor of `element`; `None` at the tail or when this queue does not own it
    pub fn next(&self, element: Element) -> Option<Element> {
        self.pool
            .arena()
            .member(self.id, element)?
            .next
            .map(Element)
    }

    /// Predecessor of `element`; `None` at the head or when this queue does not own it
    pub fn prev(&self, element: Element) -> Option<Element> {
        self.pool
            .arena()
            .member(self.id, element)?
            .prev
            .map(Element)
    }

    /// Element at position `index` counted from the head, in O(index)
    pub fn get(&self, index: usize) -> Option<Element> {
        if index >= self.len() {
            return None;
        }
        self.iter().nth(index)
    }

    /// Number of linked elements, in O(1)
    pub fn len(&self) -> usize {
        self.pool.arena().header(self.id).map_or(0, |header| header.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `element` is currently linked into this queue
    pub fn contains(&self, element: Element) -> bool {
        self.pool.arena().member(self.id, element).is_some()
    }

    /// Double-ended iterator over element handles, head to tail
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Visit each element head to tail, allowing mutation from the callback
    ///
    /// The successor is captured before `visit` runs, so the callback may
    /// remove or destroy the element it was handed. If the callback also
    /// removes that captured successor, the walk stops with
    /// [`QueueError::StaleElement`].
    ///
    /// Elements appended while the walk is on the tail are visited only if
    /// the tail element is still linked when its callback returns; otherwise
    /// the walk ends there.
    pub fn foreach<B, F>(&mut self, mut visit: F) -> QueueResult<ControlFlow<B>>
    where
        F: FnMut(&mut Self, Element) -> ControlFlow<B>,
    {
        let mut cursor = self.first();
        while let Some(current) = cursor {
            let next = self.next(current);
            if let ControlFlow::Break(value) = visit(self, current) {
                return Ok(ControlFlow::Break(value));
            }
            cursor = match next {
                Some(next) if !self.contains(next) => {
                    return Err(QueueError::StaleElement { element: next });
                }
                // The tail may have grown past `current` during the callback.
                None if self.contains(current) => self.next(current),
                other => other,
            };
        }
        Ok(ControlFlow::Continue(()))
    }

    // ---- payload access ----

    /// Run `read` on the payload bytes of `element` without copying them
    ///
    /// `None` when this queue does not own the element. The pool is borrowed
    /// while `read` runs: mutations from inside it fail with
    /// [`QueueError::PoolBusy`], and queues dropped inside it are torn down
    /// once it returns.
    pub fn with_payload<R>(&self, element: Element, read: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let result = {
            let arena = self.pool.arena();
            let entry = arena.member(self.id, element)?.entry.as_ref()?;
            read(entry.payload.as_bytes())
        };
        self.pool.reap();
        Some(result)
    }

    /// Copy of the payload bytes of `element`
    ///
    /// `None` when this queue does not own the element.
    pub fn payload(&self, element: Element) -> Option<Vec<u8>> {
        self.with_payload(element, <[u8]>::to_vec)
    }

    /// Length recorded for `element`'s payload when it was inserted
    pub fn payload_len(&self, element: Element) -> Option<usize> {
        let arena = self.pool.arena();
        arena
            .member(self.id, element)?
            .entry
            .as_ref()
            .map(|entry| entry.len)
    }

    /// Copy of the payload bytes at position `index`
    pub fn payload_at(&self, index: usize) -> Option<Vec<u8>> {
        let element = self.get(index)?;
        self.payload(element)
    }

    /// Copy every payload, head to tail
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.iter()
            .filter_map(|element| self.payload(element))
            .collect()
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        match self.close() {
            Ok(()) => {}
            Err(QueueError::PoolBusy) => {
                self.pool.defer_close(self.id);
                self.released = true;
            }
            Err(error) => {
                warn!(queue = %self.id, %error, "queue dropped without releasing its elements");
            }
        }
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("id", &self.id)
            .field("len", &self.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Queue {
    type Item = Element;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
