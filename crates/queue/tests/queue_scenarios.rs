//! End-to-end queue scenarios over shared and thread-local pools.

use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::Rc;

use lz_queue::{ElementPool, ErrorKind, PoolConfig, Queue, QueueError};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn counting_destructor(counter: &Rc<Cell<usize>>) -> impl FnOnce(lz_queue::Payload) + 'static {
    let counter = Rc::clone(counter);
    move |_| counter.set(counter.get() + 1)
}

#[test]
fn borrowed_payloads_lifecycle() {
    init_tracing();
    let destroyed = Rc::new(Cell::new(0));
    let mut queue = Queue::new().unwrap();

    for item in ["a", "b", "c"] {
        queue
            .append_with(item, 1, counting_destructor(&destroyed))
            .unwrap();
    }
    assert_eq!(queue.len(), 3);

    let mut seen = Vec::new();
    queue
        .foreach(|queue, element| {
            seen.push(queue.payload(element).unwrap());
            ControlFlow::<()>::Continue(())
        })
        .unwrap();
    assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);

    let first = queue.first().unwrap();
    queue.remove(first).unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(destroyed.get(), 0);

    let mut remaining = Vec::new();
    queue
        .foreach(|queue, element| {
            remaining.push(queue.payload(element).unwrap());
            ControlFlow::<()>::Continue(())
        })
        .unwrap();
    assert_eq!(remaining, vec![b"b".to_vec(), b"c".to_vec()]);

    queue.pool().destroy(first).unwrap();
    assert_eq!(destroyed.get(), 1);

    queue.destroy().unwrap();
    assert_eq!(destroyed.get(), 3);
}

#[test]
fn element_moves_between_queues() {
    let pool = ElementPool::with_capacity(4).unwrap();
    let mut inbox = Queue::with_pool(&pool).unwrap();
    let mut outbox = Queue::with_pool(&pool).unwrap();

    let message = inbox.append(b"hello").unwrap();
    assert_eq!(pool.owner(message), Some(inbox.id()));

    // Removal keeps the payload; it is re-inserted by copy into the next queue.
    let bytes = inbox.payload(message).unwrap();
    inbox.remove(message).unwrap();
    pool.destroy(message).unwrap();
    let moved = outbox.append(bytes).unwrap();

    assert!(inbox.is_empty());
    assert_eq!(outbox.payloads(), vec![b"hello".to_vec()]);
    assert_eq!(pool.owner(moved), Some(outbox.id()));
}

#[rstest]
#[case::front(0)]
#[case::middle(2)]
#[case::back(4)]
fn remove_at_keeps_order(#[case] index: usize) {
    let pool = ElementPool::with_capacity(8).unwrap();
    let mut queue = Queue::with_pool(&pool).unwrap();
    let items: Vec<u8> = (0..5).collect();
    for item in &items {
        queue.append(vec![*item]).unwrap();
    }

    let element = queue.get(index).unwrap();
    queue.remove_and_destroy(element).unwrap();

    let expected: Vec<Vec<u8>> = items
        .iter()
        .filter(|item| usize::from(**item) != index)
        .map(|item| vec![*item])
        .collect();
    assert_eq!(queue.payloads(), expected);

    let backwards: Vec<Vec<u8>> = queue
        .iter()
        .rev()
        .map(|element| queue.payload(element).unwrap())
        .collect();
    let mut reversed = expected;
    reversed.reverse();
    assert_eq!(backwards, reversed);
}

#[test]
fn exhausted_pool_hands_payload_back_to_destructor() {
    init_tracing();
    let pool = ElementPool::with_config(PoolConfig::new(64).with_initial_pages(0).with_max_pages(2))
        .unwrap();
    let mut queue = Queue::with_pool(&pool).unwrap();
    queue.append("one").unwrap();
    queue.append("two").unwrap();

    let released = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&released);
    let error = queue
        .append_with(vec![7u8, 7], 2, move |payload| {
            sink.borrow_mut().push(payload.as_bytes().to_vec());
        })
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::AllocationFailure);
    assert_eq!(error.code(), "POOL:ALLOC:EXHAUSTED");
    assert_eq!(*released.borrow(), vec![vec![7u8, 7]]);
    assert_eq!(queue.len(), 2);
    assert_eq!(pool.capacity(), 2);
}

#[test]
fn storage_is_reused_after_destroy() {
    let pool = ElementPool::with_capacity(2).unwrap();
    let mut queue = Queue::with_pool(&pool).unwrap();

    for round in 0..10u8 {
        let a = queue.append(vec![round]).unwrap();
        let b = queue.prepend(vec![round]).unwrap();
        queue.remove_and_destroy(a).unwrap();
        queue.remove_and_destroy(b).unwrap();
    }

    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.stats().grows, 0);
    assert_eq!(pool.stats().reuses, 20);
}

#[test]
fn stale_handle_is_rejected_after_reuse() {
    let pool = ElementPool::with_capacity(1).unwrap();
    let mut queue = Queue::with_pool(&pool).unwrap();

    let old = queue.append("old").unwrap();
    queue.remove_and_destroy(old).unwrap();
    let new = queue.append("new").unwrap();

    assert!(!queue.contains(old));
    assert!(queue.contains(new));
    assert!(queue.payload(old).is_none());
    assert_eq!(
        queue.remove(old).unwrap_err(),
        QueueError::StaleElement { element: old }
    );
    assert_eq!(queue.payload(new).unwrap(), b"new");
}

#[test]
fn empty_payload_skips_destructor() {
    let destroyed = Rc::new(Cell::new(0));
    let mut queue = Queue::new().unwrap();
    let element = queue
        .append_with(None::<Vec<u8>>, 0, counting_destructor(&destroyed))
        .unwrap();

    assert_eq!(queue.payload(element).unwrap().len(), 0);
    queue.remove_and_destroy(element).unwrap();
    assert_eq!(destroyed.get(), 0);
}

#[test]
fn queue_ids_are_distinct_within_a_pool() {
    let pool = ElementPool::with_capacity(0).unwrap();
    let a = Queue::with_pool(&pool).unwrap();
    let b = Queue::with_pool(&pool).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(a.id().to_string(), "queue #0.0");
}
