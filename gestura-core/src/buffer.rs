//! Time-Stamped Circular Buffer for Sensor Streams
//!
//! ## Overview
//!
//! Every sensor stream (and the synchronized combined stream) keeps its
//! recent history in a `RingBuffer<T>`. The buffer has a fixed capacity
//! chosen from configuration at startup; once full, each insertion
//! overwrites the oldest sample.
//!
//! ## Windows
//!
//! Classification works on windows, the most recent slice of the buffer:
//!
//! - `newest(n)`: best effort, returns whatever is available up to `n`
//! - `window_by_size(n)`: exactly `n` samples or `InsufficientData`
//! - `window_by_duration(d, n)`: exactly `n` samples that all arrived within
//!   the last `d` milliseconds, or `InsufficientData`
//!
//! All windows are returned oldest first, newest last.
//!
//! ### Memory Layout
//!
//! Storage is a boxed slice of `Option<TimestampedSample<T>>` allocated once:
//!
//! ```text
//! RingBuffer (capacity 5) after 7 adds:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  5  │  6  │  2  │  3  │  4  │  ← sample number
//! └─────┴─────┴─────┴─────┴─────┘
//!             ↑
//!             └── write_pos = 2 (oldest sample, next overwrite)
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gestura_core::buffer::RingBuffer;
//! use gestura_core::time::MockTimeSource;
//!
//! let clock = Arc::new(MockTimeSource::new(0));
//! let mut history: RingBuffer<f32> = RingBuffer::with_clock(3, clock.clone());
//!
//! for value in [1.0, 2.0, 3.0, 4.0] {
//!     history.add(value);
//!     clock.advance(10);
//! }
//!
//! let values: Vec<f32> = history.iter().map(|s| s.value).collect();
//! assert_eq!(values, vec![2.0, 3.0, 4.0]);
//! ```

use crate::errors::{CoreError, CoreResult};
use crate::time::{MonotonicTime, SharedClock, Timestamp};

/// Single sample with its arrival time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampedSample<T> {
    /// Arrival time in milliseconds
    pub timestamp: Timestamp,
    /// The sample itself
    pub value: T,
}

/// Fixed-capacity circular buffer of time-stamped samples
///
/// ## Internal Invariants
///
/// - `write_pos < capacity` (next write position is always valid)
/// - `len <= capacity`
/// - Iteration yields samples in arrival order
///
/// ## Thread Safety
///
/// Not synchronized. Streams wrap their buffer in a mutex and are the only
/// writers.
pub struct RingBuffer<T> {
    data: Box<[Option<TimestampedSample<T>>]>,
    write_pos: usize,
    len: usize,
    clock: SharedClock,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer stamped by a private monotonic clock
    ///
    /// A capacity of zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, MonotonicTime::shared())
    }

    /// Creates an empty buffer stamped by the given clock
    pub fn with_clock(capacity: usize, clock: SharedClock) -> Self {
        let capacity = capacity.max(1);
        let data = (0..capacity).map(|_| None).collect::<Vec<_>>().into_boxed_slice();
        Self {
            data,
            write_pos: 0,
            len: 0,
            clock,
        }
    }

    /// Appends `value` stamped with the current time
    ///
    /// When the buffer is full this overwrites the oldest sample.
    pub fn add(&mut self, value: T) {
        let timestamp = self.clock.now();
        self.push(TimestampedSample { timestamp, value });
    }

    /// Appends an already stamped sample
    pub fn push(&mut self, sample: TimestampedSample<T>) {
        let capacity = self.capacity();
        self.data[self.write_pos] = Some(sample);
        self.write_pos = (self.write_pos + 1) % capacity;

        if self.len < capacity {
            self.len += 1;
        }
    }

    /// Maximum number of samples held
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no sample has been added yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the next add overwrites the oldest sample
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Current time according to the buffer's clock
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Get the most recent sample
    pub fn last(&self) -> Option<&TimestampedSample<T>> {
        if self.is_empty() {
            return None;
        }
        self.get(self.len - 1)
    }

    /// Iterate over samples from oldest to newest
    pub fn iter(&self) -> RingBufferIter<'_, T> {
        RingBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Drop all samples, keeping the allocation
    pub fn clear(&mut self) {
        for slot in self.data.iter_mut() {
            *slot = None;
        }
        self.write_pos = 0;
        self.len = 0;
    }

    /// Gets a sample by its logical index (0 = oldest, len-1 = newest)
    ///
    /// ```text
    /// Physical array:  [D, E, A, B, C]  (write_pos = 2)
    /// Logical view:    [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % capacity]
    /// ```
    fn get(&self, index: usize) -> Option<&TimestampedSample<T>> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < self.capacity() {
            // Not wrapped yet, data starts at 0
            index
        } else {
            (self.write_pos + index) % self.capacity()
        };

        self.data[actual_index].as_ref()
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Returns the last `min(n, len)` samples, newest last
    pub fn newest(&self, n: usize) -> Vec<TimestampedSample<T>> {
        let take = n.min(self.len);
        self.iter().skip(self.len - take).cloned().collect()
    }

    /// Returns exactly the last `max_count` samples
    ///
    /// Fails with `InsufficientData` while fewer samples are buffered.
    pub fn window_by_size(&self, max_count: usize) -> CoreResult<Vec<TimestampedSample<T>>> {
        if self.len < max_count {
            return Err(CoreError::InsufficientData {
                required: max_count,
                available: self.len,
            });
        }
        Ok(self.newest(max_count))
    }

    /// Returns the last `max_count` samples, all stamped within `duration_ms`
    ///
    /// Duration and count act as a combined floor: when fewer than
    /// `max_count` samples arrived in the last `duration_ms` milliseconds the
    /// call fails, and `available` reports how many did.
    pub fn window_by_duration(
        &self,
        duration_ms: u64,
        max_count: usize,
    ) -> CoreResult<Vec<TimestampedSample<T>>> {
        let cutoff = self.clock.now().saturating_sub(duration_ms);

        // Walk backwards from the newest sample until one falls outside the window
        let available = (0..self.len)
            .rev()
            .filter_map(|index| self.get(index))
            .take_while(|sample| sample.timestamp >= cutoff)
            .count();

        if available < max_count {
            return Err(CoreError::InsufficientData {
                required: max_count,
                available,
            });
        }
        Ok(self.newest(max_count))
    }
}

/// Iterator over buffer contents, oldest first
pub struct RingBufferIter<'a, T> {
    buffer: &'a RingBuffer<T>,
    index: usize,
}

impl<'a, T> Iterator for RingBufferIter<'a, T> {
    type Item = &'a TimestampedSample<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T> core::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MockTimeSource;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn buffer_with(capacity: usize) -> (RingBuffer<i32>, Arc<MockTimeSource>) {
        let clock = Arc::new(MockTimeSource::new(1_000));
        (RingBuffer::with_clock(capacity, clock.clone()), clock)
    }

    fn values(samples: &[TimestampedSample<i32>]) -> Vec<i32> {
        samples.iter().map(|s| s.value).collect()
    }

    #[test]
    fn empty_buffer() {
        let (buffer, _) = buffer_with(5);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.last().is_none());
        assert!(buffer.newest(3).is_empty());
    }

    #[test]
    fn add_stamps_with_clock() {
        let (mut buffer, clock) = buffer_with(5);
        buffer.add(7);
        clock.advance(25);
        buffer.add(8);

        let last = buffer.last().unwrap();
        assert_eq!(last.value, 8);
        assert_eq!(last.timestamp, 1_025);
    }

    #[test]
    fn circular_overwrite() {
        let (mut buffer, _) = buffer_with(3);
        for i in 0..5 {
            buffer.add(i);
        }

        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());
        let all: Vec<i32> = buffer.iter().map(|s| s.value).collect();
        assert_eq!(all, vec![2, 3, 4]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (mut buffer, _) = buffer_with(0);
        buffer.add(1);
        buffer.add(2);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.last().unwrap().value, 2);
    }

    #[test]
    fn newest_returns_what_is_available() {
        let (mut buffer, _) = buffer_with(10);
        for i in 0..4 {
            buffer.add(i);
        }
        assert_eq!(values(&buffer.newest(2)), vec![2, 3]);
        assert_eq!(values(&buffer.newest(10)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn window_by_size_requires_enough_samples() {
        let (mut buffer, _) = buffer_with(10);
        for i in 0..3 {
            buffer.add(i);
        }

        assert_eq!(
            buffer.window_by_size(4),
            Err(CoreError::InsufficientData { required: 4, available: 3 })
        );
        assert_eq!(values(&buffer.window_by_size(3).unwrap()), vec![0, 1, 2]);
        assert_eq!(values(&buffer.window_by_size(2).unwrap()), vec![1, 2]);
    }

    #[test]
    fn window_by_duration_excludes_stale_samples() {
        let (mut buffer, clock) = buffer_with(16);
        for i in 0..10 {
            buffer.add(i);
            clock.advance(100);
        }
        // Now = 2000; samples stamped 1000..=1900 in 100ms steps

        // Last 500ms holds samples stamped 1500..=1900
        assert_eq!(
            buffer.window_by_duration(500, 6),
            Err(CoreError::InsufficientData { required: 6, available: 5 })
        );
        assert_eq!(values(&buffer.window_by_duration(500, 5).unwrap()), vec![5, 6, 7, 8, 9]);
        assert_eq!(values(&buffer.window_by_duration(500, 2).unwrap()), vec![8, 9]);
    }

    #[test]
    fn clear_resets_state() {
        let (mut buffer, _) = buffer_with(4);
        for i in 0..6 {
            buffer.add(i);
        }
        buffer.clear();
        assert!(buffer.is_empty());
        buffer.add(42);
        assert_eq!(values(&buffer.newest(4)), vec![42]);
    }

    proptest! {
        #[test]
        fn length_never_exceeds_capacity(capacity in 1usize..64, adds in 0usize..256) {
            let (mut buffer, _) = buffer_with(capacity);
            for i in 0..adds {
                buffer.add(i as i32);
                prop_assert!(buffer.len() <= capacity);
            }
            prop_assert_eq!(buffer.len(), adds.min(capacity));
        }

        #[test]
        fn keeps_last_capacity_values_in_order(capacity in 1usize..32, extra in 0usize..64) {
            let (mut buffer, _) = buffer_with(capacity);
            let total = capacity + extra;
            for i in 0..total {
                buffer.add(i as i32);
            }
            let expected: Vec<i32> = ((total - capacity)..total).map(|i| i as i32).collect();
            let actual: Vec<i32> = buffer.iter().map(|s| s.value).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn window_by_size_is_newest_suffix(len in 0usize..40, request in 1usize..40) {
            let (mut buffer, _) = buffer_with(40);
            for i in 0..len {
                buffer.add(i as i32);
            }
            match buffer.window_by_size(request) {
                Ok(window) => {
                    prop_assert!(len >= request);
                    let expected: Vec<i32> = ((len - request)..len).map(|i| i as i32).collect();
                    prop_assert_eq!(values(&window), expected);
                }
                Err(err) => {
                    prop_assert!(len < request);
                    prop_assert_eq!(err, CoreError::InsufficientData { required: request, available: len });
                }
            }
        }
    }
}
