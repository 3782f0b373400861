//! Constants for Gestura Core
//!
//! Centralized defaults for the signal pipeline. Configuration structs take
//! their `Default` values from here, so a value changes in exactly one place.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Buffers**: Ring buffer capacities and window sizes
//! - **Time**: Polling rates and window durations
//! - **Training**: Training preconditions and prediction thresholds

/// Ring buffer capacities and classification window sizes.
pub mod buffers;

/// Polling rates, intervals and window durations.
pub mod time;

/// Training preconditions and prediction thresholds.
pub mod training;

// Re-export commonly used constants for convenience
pub use buffers::{
    ACCELEROMETER_BUFFER_SIZE, MAGNETOMETER_BUFFER_SIZE, LIGHT_BUFFER_SIZE,
    PREDICTION_SAMPLE_SIZE, PREDICTION_STEP_SIZE, MIN_WINDOW_SIZE,
};

pub use time::{MS_PER_SECOND, PREDICTION_SAMPLE_DURATION_MS, DEFAULT_UPDATES_PER_SECOND};

pub use training::{
    REQUIRED_CLASS_COUNT, MIN_RECORDINGS_PER_CLASS, DEFAULT_REQUIRED_CONFIDENCE,
};
