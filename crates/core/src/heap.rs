//! Min-heap ordered by a caller-supplied [`TotalOrder`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::ordering::TotalOrder;

pub type SharedOrder<E> = Arc<dyn TotalOrder<E>>;

/// An element carrying the order it is ranked by, so `BinaryHeap` can use it.
struct Ranked<E> {
    element: E,
    order: SharedOrder<E>,
}

impl<E> PartialEq for Ranked<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Ranked<E> {}

impl<E> PartialOrd for Ranked<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Ranked<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order.compare(&self.element, &other.element)
    }
}

pub struct MinHeap<E> {
    heap: BinaryHeap<Reverse<Ranked<E>>>,
    order: SharedOrder<E>,
}

impl<E> MinHeap<E> {
    pub fn new(order: SharedOrder<E>) -> Self {
        Self { heap: BinaryHeap::new(), order }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn order(&self) -> &SharedOrder<E> {
        &self.order
    }

    pub fn peek_min(&self) -> Option<&E> {
        self.heap.peek().map(|r| &r.0.element)
    }

    pub fn push(&mut self, element: E) {
        self.heap.push(Reverse(Ranked { element, order: Arc::clone(&self.order) }));
    }

    pub fn pop_min(&mut self) -> Option<E> {
        self.heap.pop().map(|r| r.0.element)
    }

    /// Copies the contents in heap order; sort with [`Self::order`] to rank them.
    pub fn to_unsorted_vec(&self) -> Vec<E>
    where
        E: Clone,
    {
        self.heap.iter().map(|r| r.0.element.clone()).collect()
    }
}
