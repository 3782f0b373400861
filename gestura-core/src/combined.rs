//! Stream synchronizer for merging independent sensor streams
//!
//! Sensors deliver at their own rates and never in lockstep. The
//! [`Synchronizer`] subscribes to every source and, whenever **any** of
//! them reports a new value, rebuilds a combined record from the latest
//! value of **every** source, appends it to its own ring buffer and
//! notifies its own subscribers.
//!
//! ## Last-Value Hold
//!
//! ```text
//! accel:  a1    a2    a3          a4
//! magnet:    m1             m2
//! out:    a1m0 a1m1 a2m1 a3m1 a3m2 a4m2
//! ```
//!
//! Sources that did not change are reused as-is (no interpolation, no
//! resampling), so the combined rate is the union of the source rates and a
//! fast sensor drags a slow sensor's stale value forward.
//!
//! The combined value is always derived: `put` fails with
//! `UnsupportedOperation`.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use crate::buffer::RingBuffer;
use crate::errors::{CoreError, CoreResult};
use crate::observe::{Subscribers, Subscription};
use crate::sample::{AccelerometerSample, CombinedSample, LightSample, MagnetometerSample, SensorSample};
use crate::stream::SensorStream;
use crate::time::{MonotonicTime, SharedClock};
use crate::traits::{BufferGuard, ChangeSource, LiveData};

type Combiner<T> = Box<dyn Fn() -> T + Send + Sync>;

struct SyncShared<T> {
    combine: Combiner<T>,
    current: Mutex<Option<T>>,
    buffer: Mutex<RingBuffer<T>>,
    subscribers: Subscribers<T>,
}

impl<T: SensorSample> SyncShared<T> {
    fn recompute(&self) {
        let value = (self.combine)();
        *self.current.lock() = Some(value.clone());
        self.buffer.lock().add(value.clone());
        self.subscribers.notify(&value);
    }
}

/// Fan-in of N independent streams into one derived stream
pub struct Synchronizer<T> {
    shared: Arc<SyncShared<T>>,
    sources: Mutex<Vec<Subscription>>,
}

impl<T: SensorSample> Synchronizer<T> {
    /// Subscribe to `sources` and derive values with `combine`
    ///
    /// `combine` reads the current value of each source (typically by
    /// capturing cloned stream handles and calling `latest()`).
    pub fn new<F>(
        sources: &[&dyn ChangeSource],
        capacity: usize,
        clock: SharedClock,
        combine: F,
    ) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let shared = Arc::new(SyncShared {
            combine: Box::new(combine),
            current: Mutex::new(None),
            buffer: Mutex::new(RingBuffer::with_clock(capacity, clock)),
            subscribers: Subscribers::new(),
        });

        // Sources only hold a weak reference back, so dropping the
        // synchronizer is enough to break the cycle
        let subscriptions = sources
            .iter()
            .map(|source| {
                let weak: Weak<SyncShared<T>> = Arc::downgrade(&shared);
                source.on_change(Arc::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.recompute();
                    }
                }))
            })
            .collect();

        Self {
            shared,
            sources: Mutex::new(subscriptions),
        }
    }

    /// Number of sources still wired in
    pub fn source_count(&self) -> usize {
        self.sources.lock().len()
    }

    /// Unsubscribe from every source. Idempotent.
    pub fn dispose(&self) {
        let mut sources = self.sources.lock();
        if !sources.is_empty() {
            log::debug!("Synchronizer releasing {} source subscriptions", sources.len());
        }
        sources.clear();
    }
}

impl<T: SensorSample> LiveData<T> for Synchronizer<T> {
    fn put(&self, _value: T) -> CoreResult<()> {
        log::error!("Rejected write to synchronized stream; its value is derived from its sources");
        Err(CoreError::UnsupportedOperation { operation: "put on derived stream" })
    }

    fn try_latest(&self) -> Option<T> {
        self.shared.current.lock().clone()
    }

    fn buffer(&self) -> BufferGuard<'_, T> {
        self.shared.buffer.lock()
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.shared.subscribers.subscribe(callback)
    }
}

impl<T: SensorSample> ChangeSource for Synchronizer<T> {
    fn on_change(&self, callback: Arc<dyn Fn() + Send + Sync>) -> Subscription {
        self.shared.subscribers.subscribe(move |_| callback())
    }
}

/// Synchronized accelerometer + magnetometer + light stream
pub type CombinedLiveData = Synchronizer<CombinedSample>;

impl Synchronizer<CombinedSample> {
    /// Wire the three device sensors into one combined stream
    ///
    /// The combined buffer is as large as the smallest source buffer.
    pub fn combine_sensors(
        accel: &SensorStream<AccelerometerSample>,
        magnet: &SensorStream<MagnetometerSample>,
        light: &SensorStream<LightSample>,
        clock: SharedClock,
    ) -> Self {
        let capacity = [
            accel.buffer().capacity(),
            magnet.buffer().capacity(),
            light.buffer().capacity(),
        ]
        .into_iter()
        .min()
        .unwrap_or(1);

        let sources: [&dyn ChangeSource; 3] = [accel, magnet, light];
        let (a, m, l) = (accel.clone(), magnet.clone(), light.clone());
        Self::new(&sources, capacity, clock, move || {
            CombinedSample::from_parts(&a.latest(), &m.latest(), &l.latest())
        })
    }

    /// Same as [`combine_sensors`](Self::combine_sensors) with a private monotonic clock
    pub fn from_sensors(
        accel: &SensorStream<AccelerometerSample>,
        magnet: &SensorStream<MagnetometerSample>,
        light: &SensorStream<LightSample>,
    ) -> Self {
        Self::combine_sensors(accel, magnet, light, MonotonicTime::shared())
    }
}
