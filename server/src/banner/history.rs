use std::collections::VecDeque;

use parking_lot::Mutex;

/// Number of samples kept for the sparkline (one per sampling interval).
pub const HISTORY_CAPACITY: usize = 24;

/// Rolling window of online-player counts.
///
/// Written by the query supervisor's sampler, read by every banner render.
/// All access goes through one lock so a snapshot never observes a
/// half-applied append.
#[derive(Debug, Default)]
pub struct HistoryBuffer {
    samples: Mutex<VecDeque<u32>>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY + 1)),
        }
    }

    /// Append a sample, evicting the oldest ones beyond capacity.
    pub fn record(&self, count: u32) {
        let mut samples = self.samples.lock();
        samples.push_back(count);
        while samples.len() > HISTORY_CAPACITY {
            samples.pop_front();
        }
    }

    /// Copy of the samples, oldest first.
    pub fn snapshot(&self) -> Vec<u32> {
        self.samples.lock().iter().copied().collect()
    }

    /// Largest sample, never below 1 so it can be used as a chart divisor.
    pub fn max_value(&self) -> u32 {
        self.samples.lock().iter().copied().max().unwrap_or(0).max(1)
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn buffer_of(values: &[u32]) -> HistoryBuffer {
        let history = HistoryBuffer::new();
        for &v in values {
            history.record(v);
        }
        history
    }

    #[test]
    fn test_empty_buffer() {
        let history = HistoryBuffer::new();
        assert!(history.is_empty());
        assert!(history.snapshot().is_empty());
        assert_eq!(history.max_value(), 1);
    }

    #[test]
    fn test_max_value() {
        assert_eq!(buffer_of(&[3, 1, 4, 1, 5]).max_value(), 5);
        // floor of 1 applies to all-zero history
        assert_eq!(buffer_of(&[0, 0]).max_value(), 1);
    }

    #[test]
    fn test_snapshot_is_oldest_first() {
        assert_eq!(buffer_of(&[7, 8, 9]).snapshot(), vec![7, 8, 9]);
    }

    #[test]
    fn test_capacity_keeps_newest_in_order() {
        let history = HistoryBuffer::new();
        for i in 0..40 {
            history.record(i);
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        let expected: Vec<u32> = (16..40).collect();
        assert_eq!(history.snapshot(), expected);
    }

    #[test]
    fn test_exactly_at_capacity() {
        let values: Vec<u32> = (0..HISTORY_CAPACITY as u32).collect();
        let history = buffer_of(&values);
        assert_eq!(history.snapshot(), values);
        history.record(100);
        assert_eq!(history.snapshot().first(), Some(&1));
        assert_eq!(history.snapshot().last(), Some(&100));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let history = buffer_of(&[1, 2]);
        let mut snap = history.snapshot();
        snap.push(99);
        snap[0] = 42;
        assert_eq!(history.snapshot(), vec![1, 2]);
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let history = Arc::new(HistoryBuffer::new());
        let mut handles = Vec::new();
        for t in 0..4 {
            let history = history.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..200 {
                    history.record(t * 1000 + i);
                    let snap = history.snapshot();
                    assert!(snap.len() <= HISTORY_CAPACITY);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
    }
}
