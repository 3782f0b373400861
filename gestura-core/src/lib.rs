//! Core signal pipeline for Gestura
//!
//! Ingests live accelerometer, magnetometer and light samples from a
//! wearable device, buffers them with time semantics, and synchronizes the
//! independent sensor streams into one combined stream that classification
//! windows are drawn from.
//!
//! Data flow:
//! ```text
//! transport ──put──► SensorStream ──notify──► Synchronizer ──add──► combined RingBuffer
//!                        │                                              │
//!                    RingBuffer                              windows for classification
//! ```
//!
//! ```rust
//! use gestura_core::{CombinedLiveData, LiveData, SensorStream};
//! use gestura_core::sample::{AccelerometerSample, LightSample, MagnetometerSample};
//!
//! let accel = SensorStream::new(256);
//! let magnet = SensorStream::new(256);
//! let light = SensorStream::new(256);
//! let combined = CombinedLiveData::from_sensors(&accel, &magnet, &light);
//!
//! accel.put(AccelerometerSample::new(0.1, -0.2, 1.0)).unwrap();
//! magnet.put(MagnetometerSample::new(12.0, 3.0, -40.0)).unwrap();
//!
//! assert_eq!(combined.buffer().len(), 2);
//! assert_eq!(combined.latest().magz, -40.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Fixed-capacity time-stamped ring buffer
pub mod buffer;
/// Sensor channels and channel selection
pub mod channel;
/// Fan-in of sensor streams into a combined stream
pub mod combined;
/// Buffer configuration
pub mod config;
/// Pipeline constants
pub mod constants;
/// Error types
pub mod errors;
/// Publish/subscribe primitives
pub mod observe;
/// Sensor sample records
pub mod sample;
/// Per-sensor live streams
pub mod stream;
/// Time sources
pub mod time;
/// Live data traits
pub mod traits;

// Public API
pub use buffer::{RingBuffer, TimestampedSample};
pub use channel::{Channel, ChannelSelection};
pub use combined::{CombinedLiveData, Synchronizer};
pub use config::BufferConfig;
pub use errors::{CoreError, CoreResult};
pub use observe::{Store, Subscribers, Subscription};
pub use sample::{AccelerometerSample, CombinedSample, LightSample, MagnetometerSample, SensorSample};
pub use stream::SensorStream;
pub use time::{MockTimeSource, MonotonicTime, SharedClock, TimeSource, Timestamp};
pub use traits::{ChangeSource, LiveData};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
