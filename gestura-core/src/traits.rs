//! Core traits for live sensor data
//!
//! These traits define the interface shared by raw sensor streams and the
//! synchronized combined stream. Keep them small: consumers only need the
//! latest value, the buffered history, and change notifications.

use parking_lot::MutexGuard;
use std::sync::Arc;

use crate::buffer::RingBuffer;
use crate::errors::CoreResult;
use crate::observe::Subscription;
use crate::sample::SensorSample;

/// Locked view of a stream's ring buffer
pub type BufferGuard<'a, T> = MutexGuard<'a, RingBuffer<T>>;

/// Callback carrying no payload, used for type-erased change notification
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// A live, observable stream of samples backed by a ring buffer
pub trait LiveData<T: SensorSample> {
    /// Push a new value into the stream
    ///
    /// Derived streams reject this with `UnsupportedOperation`.
    fn put(&self, value: T) -> CoreResult<()>;

    /// Most recent value, or the zero default if nothing arrived yet
    fn latest(&self) -> T {
        self.try_latest().unwrap_or_default()
    }

    /// Most recent value, `None` until the first sample arrives
    fn try_latest(&self) -> Option<T>;

    /// Whether at least one real sample has been received
    fn has_data(&self) -> bool {
        self.try_latest().is_some()
    }

    /// Locked access to the buffered history
    ///
    /// Do not hold the guard across a call that may push into this stream.
    fn buffer(&self) -> BufferGuard<'_, T>;

    /// Observe new values; the callback runs on the pushing thread
    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static;

    /// Number of scalar series in each sample
    fn series_size(&self) -> usize {
        T::LABELS.len()
    }

    /// Display label for each series
    fn labels(&self) -> &'static [&'static str] {
        T::LABELS
    }
}

/// Type-erased change notification
///
/// Lets the synchronizer fan in streams of different sample types.
pub trait ChangeSource {
    /// Run `callback` after every new value
    fn on_change(&self, callback: ChangeCallback) -> Subscription;
}
