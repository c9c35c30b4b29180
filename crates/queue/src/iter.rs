//! Element iteration

use core::iter::FusedIterator;

use crate::element::Element;
use crate::queue::Queue;

/// Iterator over a queue's element handles
///
/// Created by [`Queue::iter`]. Walks from both ends toward the middle and
/// never yields an element twice.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    queue: &'a Queue,
    front: Option<Element>,
    back: Option<Element>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(queue: &'a Queue) -> Self {
        Self {
            front: queue.first(),
            back: queue.last(),
            remaining: queue.len(),
            queue,
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.front?;
        self.remaining -= 1;
        self.front = self.queue.next(current);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Element> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.back?;
        self.remaining -= 1;
        self.back = self.queue.prev(current);
        Some(current)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{ElementPool, Queue};

    #[test]
    fn meets_in_the_middle() {
        let pool = ElementPool::with_capacity(8).unwrap();
        let mut queue = Queue::with_pool(&pool).unwrap();
        let elements: Vec<_> = (0..5u8).map(|i| queue.append(vec![i]).unwrap()).collect();

        let mut iter = queue.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some(elements[0]));
        assert_eq!(iter.next_back(), Some(elements[4]));
        assert_eq!(iter.next_back(), Some(elements[3]));
        assert_eq!(iter.next(), Some(elements[1]));
        assert_eq!(iter.next(), Some(elements[2]));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let pool = ElementPool::with_capacity(1).unwrap();
        let queue = Queue::with_pool(&pool).unwrap();
        assert_eq!(queue.iter().count(), 0);
        assert_eq!((&queue).into_iter().next_back(), None);
    }
}
