//! # lz-queue
//!
//! Doubly-linked queue whose elements live in a block pool.
//!
//! Each element carries an opaque [`Payload`] and an optional release action.
//! Elements are addressed through copyable [`Element`] handles; a handle that
//! outlives its element is detected and rejected rather than dereferenced.
//!
//! ## Features
//!
//! - O(1) append, prepend and removal of any element
//! - Element storage recycled through [`lz_pool`]: page reuse before growth
//! - One lazily created [`ElementPool`] per thread, or explicit shared pools
//! - Removal and destruction as separate steps, so elements can move between queues
//! - Safe mutation from inside [`Queue::foreach`] callbacks and destructors
//!
//! ## Quick Start
//!
//! ```
//! use std::ops::ControlFlow;
//!
//! use lz_queue::Queue;
//!
//! let mut queue = Queue::new()?;
//! queue.append("a")?;
//! queue.append("b")?;
//! queue.append(String::from("c"))?;
//!
//! let mut seen = Vec::new();
//! queue.foreach(|queue, element| {
//!     seen.push(queue.payload(element));
//!     ControlFlow::<()>::Continue(())
//! })?;
//! assert_eq!(seen.len(), 3);
//!
//! let first = queue.first().expect("queue is not empty");
//! queue.remove_and_destroy(first)?;
//! assert_eq!(queue.len(), 2);
//! # Ok::<(), lz_queue::QueueError>(())
//! ```

mod element;
mod element_pool;
mod error;
mod iter;
mod node;
mod payload;
mod queue;

pub use element::{Element, QueueId};
pub use element_pool::{DEFAULT_ELEMENT_PAGES, ElementPool};
pub use error::{QueueError, QueueResult};
pub use iter::Iter;
pub use lz_pool::{ErrorKind, PoolConfig, PoolStats};
pub use payload::{Destructor, Payload};
pub use queue::Queue;
