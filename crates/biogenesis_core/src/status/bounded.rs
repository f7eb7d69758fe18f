//! Capacity-bounded sequences.

use std::collections::VecDeque;

/// Newest-first sequence; pushing past capacity drops the oldest (tail).
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// `capacity` of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Inserts at the head; returns how many entries were evicted.
    pub fn push(&mut self, item: T) -> usize {
        self.items.push_front(item);
        let mut evicted = 0;
        while self.items.len() > self.capacity {
            self.items.pop_back();
            evicted += 1;
        }
        evicted
    }

    /// Newest entry.
    pub fn newest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Iterates newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::BoundedLog;

    #[test]
    fn keeps_only_most_recent_entries() {
        let mut log = BoundedLog::new(3);
        for value in 1..=5 {
            log.push(value);
        }
        assert_eq!(log.iter().copied().collect::<Vec<_>>(), vec![5, 4, 3]);
        assert_eq!(log.newest(), Some(&5));
    }

    #[test]
    fn push_reports_evictions() {
        let mut log = BoundedLog::new(1);
        assert_eq!(log.push("a"), 0);
        assert_eq!(log.push("b"), 1);
        assert_eq!(log.len(), 1);
    }
}
