//! Per-sensor live streams
//!
//! A [`SensorStream`] is the entry point for raw hardware data. The
//! transport layer calls `put` for every reading; the stream then
//!
//! 1. overwrites its current-value cell,
//! 2. appends the reading to its ring buffer (stamped on arrival),
//! 3. notifies subscribers synchronously on the calling thread.
//!
//! Handles are cheap to clone and all refer to the same stream.
//!
//! ## Missing Data
//!
//! `latest()` reports the all-zero default until the first sample arrives,
//! which looks exactly like a genuine zero reading. Consumers that care use
//! `has_data()` / `try_latest()` instead.
//!
//! ```rust
//! use gestura_core::{LiveData, SensorStream};
//! use gestura_core::sample::LightSample;
//!
//! let light: SensorStream<LightSample> = SensorStream::new(64);
//! assert!(!light.has_data());
//! assert_eq!(light.latest(), LightSample::default());
//!
//! light.put(LightSample::new(0.5)).unwrap();
//! assert_eq!(light.latest().l, 0.5);
//! assert_eq!(light.buffer().len(), 1);
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

use crate::buffer::RingBuffer;
use crate::errors::CoreResult;
use crate::observe::{Subscribers, Subscription};
use crate::sample::SensorSample;
use crate::time::{MonotonicTime, SharedClock};
use crate::traits::{BufferGuard, ChangeCallback, ChangeSource, LiveData};

struct StreamInner<T> {
    current: Mutex<Option<T>>,
    buffer: Mutex<RingBuffer<T>>,
    subscribers: Subscribers<T>,
}

/// Live value holder for one sensor
pub struct SensorStream<T> {
    inner: Arc<StreamInner<T>>,
}

impl<T> Clone for SensorStream<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: SensorSample> SensorStream<T> {
    /// Stream with a private monotonic clock
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, MonotonicTime::shared())
    }

    /// Stream whose buffer is stamped by `clock`
    pub fn with_clock(capacity: usize, clock: SharedClock) -> Self {
        Self {
            inner: Arc::new(StreamInner {
                current: Mutex::new(None),
                buffer: Mutex::new(RingBuffer::with_clock(capacity, clock)),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

impl<T: SensorSample> LiveData<T> for SensorStream<T> {
    fn put(&self, value: T) -> CoreResult<()> {
        *self.inner.current.lock() = Some(value.clone());
        self.inner.buffer.lock().add(value.clone());
        // Locks are released before notifying so subscribers can read back
        self.inner.subscribers.notify(&value);
        Ok(())
    }

    fn try_latest(&self) -> Option<T> {
        self.inner.current.lock().clone()
    }

    fn buffer(&self) -> BufferGuard<'_, T> {
        self.inner.buffer.lock()
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }
}

impl<T: SensorSample> ChangeSource for SensorStream<T> {
    fn on_change(&self, callback: ChangeCallback) -> Subscription {
        self.inner.subscribers.subscribe(move |_| callback())
    }
}
