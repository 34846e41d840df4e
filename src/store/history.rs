//! Most-recent-first sequence with a fixed capacity.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self { items: VecDeque::with_capacity(capacity), capacity }
    }

    /// Builds from a most-recent-first list, keeping the first `capacity` items.
    pub fn from_recent_first(capacity: usize, items: Vec<T>) -> Self {
        let mut items: VecDeque<T> = items.into();
        items.truncate(capacity);
        Self { items, capacity }
    }

    /// Inserts at the front, dropping the oldest item on overflow.
    pub fn push_front(&mut self, item: T) {
        self.items.push_front(item);
        self.items.truncate(self.capacity);
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T: PartialEq> BoundedHistory<T> {
    /// Moves `item` to the front, removing any equal entry first.
    pub fn promote(&mut self, item: T) {
        self.items.retain(|existing| existing != &item);
        self.push_front(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_drops_oldest() {
        let mut history = BoundedHistory::new(3);
        for n in 1..=5 {
            history.push_front(n);
        }

        assert_eq!(history.to_vec(), vec![5, 4, 3]);
        assert_eq!(history.front(), Some(&5));
    }

    #[test]
    fn promote_deduplicates() {
        let mut history = BoundedHistory::new(10);
        history.promote("chicken");
        history.promote("rice");
        history.promote("chicken");

        assert_eq!(history.to_vec(), vec!["chicken", "rice"]);
    }

    #[test]
    fn from_recent_first_truncates() {
        let history = BoundedHistory::from_recent_first(2, vec!['c', 'b', 'a']);

        assert_eq!(history.to_vec(), vec!['c', 'b']);
        assert_eq!(history.capacity(), 2);
    }
}
