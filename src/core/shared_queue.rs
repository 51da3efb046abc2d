//! A mutex-guarded work queue.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A FIFO queue guarded by a single mutex.
///
/// Every world-level work list (pending modifications, chunks awaiting a mesh, meshes
/// ready to draw) is one of these. Producers and consumers may live on different
/// threads; each operation takes the lock exactly once, so no caller ever observes a
/// half-applied push or pop.
///
/// # Examples
///
/// ```ignore
/// let queue = SharedQueue::new();
/// queue.push_back(1);
/// queue.push_front(0);
/// assert_eq!(queue.pop_front(), Some(0));
/// ```
#[derive(Debug)]
pub struct SharedQueue<T: Send> {
    items: Mutex<VecDeque<T>>,
}

impl<T: Send> SharedQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item to the back of the queue.
    pub fn push_back(&self, item: T) {
        self.lock().push_back(item);
    }

    /// Inserts an item at the front of the queue, ahead of all waiting work.
    pub fn push_front(&self, item: T) {
        self.lock().push_front(item);
    }

    /// Removes and returns the item at the front of the queue.
    pub fn pop_front(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Removes and returns the front item only if `ready` accepts it.
    ///
    /// The check and the removal happen under the same lock.
    pub fn pop_front_if(&self, ready: impl FnOnce(&T) -> bool) -> Option<T> {
        let mut items = self.lock();
        match items.front() {
            Some(front) if ready(front) => items.pop_front(),
            _ => None,
        }
    }

    /// Removes and returns the first item, in queue order, that `accept` claims.
    ///
    /// Items that are skipped keep their relative order.
    pub fn pop_first_where(&self, mut accept: impl FnMut(&T) -> bool) -> Option<T> {
        let mut items = self.lock();
        let position = items.iter().position(|item| accept(item))?;
        items.remove(position)
    }

    /// Takes every queued item, leaving the queue empty.
    pub fn drain_all(&self) -> Vec<T> {
        self.lock().drain(..).collect()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<T: Send + PartialEq> SharedQueue<T> {
    /// Appends `item` unless an equal item is already queued.
    ///
    /// # Returns
    /// `true` if the item was added.
    pub fn push_back_unique(&self, item: T) -> bool {
        let mut items = self.lock();
        if items.contains(&item) {
            return false;
        }
        items.push_back(item);
        true
    }

    /// Places `item` at the front of the queue, moving an equal queued item there
    /// instead of duplicating it.
    pub fn push_front_unique(&self, item: T) {
        let mut items = self.lock();
        if let Some(position) = items.iter().position(|queued| *queued == item) {
            items.remove(position);
        }
        items.push_front(item);
    }

    /// Returns true if an equal item is queued.
    pub fn contains(&self, item: &T) -> bool {
        self.lock().contains(item)
    }
}

impl<T: Send> Default for SharedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_pushes_do_not_duplicate() {
        let queue = SharedQueue::new();
        assert!(queue.push_back_unique(1));
        assert!(queue.push_back_unique(2));
        assert!(!queue.push_back_unique(1));
        queue.push_front_unique(2);

        assert_eq!(queue.drain_all(), vec![2, 1]);
    }

    #[test]
    fn pop_first_where_keeps_order_of_skipped_items() {
        let queue = SharedQueue::new();
        for i in 0..5 {
            queue.push_back(i);
        }

        assert_eq!(queue.pop_first_where(|item| *item % 2 == 1), Some(1));
        assert_eq!(queue.pop_front_if(|item| *item == 3), None);
        assert_eq!(queue.pop_front_if(|item| *item == 0), Some(0));
        assert_eq!(queue.drain_all(), vec![2, 3, 4]);
        assert!(queue.is_empty());
    }
}
