//! Ring Buffer Implementation

/// Default buffer capacity (2400 samples = one dataset segment)
pub const DEFAULT_CAPACITY: usize = 2400;

/// Bounded ring buffer of signal samples
///
/// Pushing into a full buffer overwrites the oldest sample. Reads always
/// return samples in chronological order (oldest first), which is the order
/// feature extraction expects.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    /// Pre-allocated storage
    storage: Box<[f64]>,
    /// Next write position
    head: usize,
    /// Number of valid samples
    len: usize,
    /// Total samples written (for statistics)
    total_written: u64,
}

impl SampleBuffer {
    /// Create a new buffer with given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![0.0; capacity.max(1)].into_boxed_slice(),
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Create a buffer with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Append a sample (overwrites oldest if full)
    pub fn push(&mut self, sample: f64) {
        let capacity = self.capacity();
        self.storage[self.head] = sample;
        self.head = (self.head + 1) % capacity;
        if self.len < capacity {
            self.len += 1;
        }
        self.total_written += 1;
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Get fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Read the last N samples, oldest first
    pub fn read_last(&self, count: usize) -> Vec<f64> {
        let count = count.min(self.len);
        let capacity = self.capacity();
        let start = (self.head + capacity - count) % capacity;

        (0..count)
            .map(|i| self.storage[(start + i) % capacity])
            .collect()
    }

    /// Read every held sample, oldest first
    pub fn to_vec(&self) -> Vec<f64> {
        self.read_last(self.len)
    }

    /// Get total samples written (for statistics)
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_push_and_read() {
        let mut buffer = SampleBuffer::new(10);

        for i in 0..5 {
            buffer.push(i as f64);
        }

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.read_last(3), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut buffer = SampleBuffer::new(5);

        for i in 0..12 {
            buffer.push(i as f64);
        }

        assert_eq!(buffer.len(), 5);
        assert!(buffer.is_full());
        assert_eq!(buffer.to_vec(), vec![7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(buffer.total_written(), 12);
    }

    #[test]
    fn test_read_more_than_held() {
        let mut buffer = SampleBuffer::new(8);
        buffer.push(1.0);
        buffer.push(2.0);
        assert_eq!(buffer.read_last(100), vec![1.0, 2.0]);
    }

    #[test]
    fn test_fill_ratio() {
        let mut buffer = SampleBuffer::new(100);
        assert_eq!(buffer.fill_ratio(), 0.0);

        for _ in 0..50 {
            buffer.push(0.0);
        }

        assert!((buffer.fill_ratio() - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_clear() {
        let mut buffer = SampleBuffer::new(4);
        buffer.push(1.0);
        buffer.push(2.0);
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.read_last(2).is_empty());
    }

    proptest! {
        #[test]
        fn prop_window_matches_tail(
            samples in proptest::collection::vec(-1.0e3f64..1.0e3, 0..300),
            capacity in 1usize..128,
            window in 0usize..160,
        ) {
            let mut buffer = SampleBuffer::new(capacity);
            for &s in &samples {
                buffer.push(s);
            }

            let expected_len = window.min(capacity).min(samples.len());
            let expected = samples[samples.len() - expected_len..].to_vec();
            prop_assert_eq!(buffer.read_last(window), expected);
        }
    }
}
