//! Capacity-Bounded Ring Buffer

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default capacity (100 samples = a few seconds of frames)
pub const DEFAULT_CAPACITY: usize = 100;

/// FIFO ring that drops its oldest sample once full
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingBuffer<T> {
    /// Stored samples, oldest first
    storage: VecDeque<T>,
    /// Maximum number of samples retained
    capacity: usize,
    /// Total samples written (for statistics)
    total_written: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    /// Push a sample, returning the evicted oldest sample if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.storage.len() >= self.capacity {
            self.storage.pop_front()
        } else {
            None
        };
        self.storage.push_back(item);
        self.total_written += 1;
        evicted
    }

    /// Get the number of samples currently in the buffer
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.storage.len() == self.capacity
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&T> {
        self.storage.back()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.storage.iter()
    }

    /// Get total samples written since creation or last clear
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.storage.clear();
        self.total_written = 0;
    }
}

impl RingBuffer<f32> {
    /// Arithmetic mean of the current contents, `None` when empty
    pub fn mean(&self) -> Option<f32> {
        if self.storage.is_empty() {
            return None;
        }
        let sum: f64 = self.storage.iter().map(|&v| v as f64).sum();
        Some((sum / self.storage.len() as f64) as f32)
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_and_read() {
        let mut buffer = RingBuffer::new(10);

        for i in 0..5 {
            assert!(buffer.push(i).is_none());
        }

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.latest(), Some(&4));
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut buffer = RingBuffer::new(5);

        for i in 0..5 {
            buffer.push(i);
        }
        assert!(buffer.is_full());

        // Oldest should be evicted
        assert_eq!(buffer.push(5), Some(0));
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.iter().next(), Some(&1));
        assert_eq!(buffer.total_written(), 6);
    }

    #[test]
    fn test_mean() {
        let mut buffer: RingBuffer<f32> = RingBuffer::new(3);
        assert_eq!(buffer.mean(), None);

        buffer.push(0.2);
        buffer.push(0.4);
        assert!((buffer.mean().unwrap() - 0.3).abs() < 1e-6);

        // 0.2 evicted after two more pushes
        buffer.push(0.6);
        buffer.push(0.8);
        assert!((buffer.mean().unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_clear() {
        let mut buffer = RingBuffer::new(4);
        buffer.push(1.0_f32);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.total_written(), 0);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(capacity in 1usize..64, pushes in 0usize..256) {
            let mut buffer = RingBuffer::new(capacity);
            for i in 0..pushes {
                buffer.push(i);
                prop_assert!(buffer.len() <= capacity);
            }
            prop_assert_eq!(buffer.len(), pushes.min(capacity));
            if pushes > 0 {
                prop_assert_eq!(buffer.latest(), Some(&(pushes - 1)));
            }
        }
    }
}
