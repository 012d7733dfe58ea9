//! Bounded FIFO history.

use std::collections::VecDeque;

/// Ordered history that evicts its oldest entries beyond a fixed capacity.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting from the front if full.
    pub fn push(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> BoundedHistory<T> {
    /// Copy of the entries, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest() {
        let mut history = BoundedHistory::new(3);
        for i in 0..5 {
            history.push(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.to_vec(), vec![2, 3, 4]);
        assert_eq!(history.last(), Some(&4));
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = BoundedHistory::new(0);
        history.push(1);
        assert!(history.is_empty());
    }
}
