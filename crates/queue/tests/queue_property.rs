//! Property tests for queue structure.
//!
//! After any sequence of inserts and removals the stored length matches both
//! traversal directions, and contents match a `VecDeque` model.

use std::collections::VecDeque;

use lz_queue::{ElementPool, Queue};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Append(u8),
    Prepend(u8),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::Append),
        any::<u8>().prop_map(Op::Prepend),
        (0usize..64).prop_map(Op::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_deque_model(ops in prop::collection::vec(op(), 1..100)) {
        let pool = ElementPool::with_capacity(4).unwrap();
        let mut queue = Queue::with_pool(&pool).unwrap();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Append(value) => {
                    queue.append(vec![value]).unwrap();
                    model.push_back(value);
                }
                Op::Prepend(value) => {
                    queue.prepend(vec![value]).unwrap();
                    model.push_front(value);
                }
                Op::Remove(pick) if !model.is_empty() => {
                    let index = pick % model.len();
                    let element = queue.get(index).unwrap();
                    queue.remove_and_destroy(element).unwrap();
                    model.remove(index);
                }
                Op::Remove(_) => {}
            }

            prop_assert_eq!(queue.len(), model.len());
            prop_assert_eq!(queue.iter().count(), model.len());
            prop_assert_eq!(queue.iter().rev().count(), model.len());
            prop_assert_eq!(pool.in_use(), model.len());
        }

        let contents: Vec<u8> = queue.payloads().into_iter().flatten().collect();
        prop_assert_eq!(contents, Vec::from(model));
    }
}
