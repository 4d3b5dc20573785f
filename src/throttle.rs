//! Batched action queue
//!
//! Coalesces rapid incremental updates into one store flush per interval
//! window while keeping every action, in arrival order. A window opens
//! when the first item arrives; once it has aged past the interval the
//! whole batch is released together. The crate owns no timers: the host
//! loop supplies `Instant`s and pumps the queue.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Default flush window for keystroke-driven line updates
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct BatchQueue<T> {
    interval: Duration,
    queue: VecDeque<T>,
    window_start: Option<Instant>,
}

impl<T> BatchQueue<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            queue: VecDeque::new(),
            window_start: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Enqueue an item, opening a window if none is open
    pub fn push(&mut self, item: T, now: Instant) {
        if self.queue.is_empty() {
            self.window_start = Some(now);
        }
        self.queue.push_back(item);
    }

    /// All queued items in arrival order when the current window is due,
    /// empty otherwise
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        match self.window_start {
            Some(start) if now.duration_since(start) >= self.interval => {
                self.window_start = None;
                self.queue.drain(..).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.window_start = None;
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for BatchQueue<T> {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_released_before_window_ages() {
        let mut queue = BatchQueue::new(Duration::from_millis(50));
        let start = Instant::now();
        queue.push(1, start);
        queue.push(2, start + Duration::from_millis(10));

        assert!(queue.drain_due(start + Duration::from_millis(49)).is_empty());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_whole_batch_released_in_order() {
        let mut queue = BatchQueue::new(Duration::from_millis(50));
        let start = Instant::now();
        for i in 0..10u64 {
            queue.push(i, start + Duration::from_millis(i));
        }

        let batch = queue.drain_due(start + Duration::from_millis(50));
        assert_eq!(batch, (0..10u64).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_new_window_opens_after_flush() {
        let mut queue = BatchQueue::new(Duration::from_millis(50));
        let start = Instant::now();
        queue.push('a', start);
        assert_eq!(queue.drain_due(start + Duration::from_millis(60)), vec!['a']);

        // The next push opens a fresh window from its own arrival time
        let later = start + Duration::from_millis(100);
        queue.push('b', later);
        assert!(queue.drain_due(later + Duration::from_millis(10)).is_empty());
        assert_eq!(queue.drain_due(later + Duration::from_millis(50)), vec!['b']);
    }

    #[test]
    fn test_clear_resets_window() {
        let mut queue = BatchQueue::new(Duration::from_millis(50));
        let start = Instant::now();
        queue.push(1, start);
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.drain_due(start + Duration::from_secs(1)).is_empty());
    }
}
