//! Buffer Sizes and Window Limits
//!
//! Capacities are per sensor stream and fixed at startup. The device streams
//! accelerometer and magnetometer data at roughly 50 Hz, so 20 000 samples
//! keep several minutes of history for live graphs and recording.

// ===== RING BUFFER CAPACITIES =====

/// Accelerometer history capacity (samples).
pub const ACCELEROMETER_BUFFER_SIZE: usize = 20_000;

/// Magnetometer history capacity (samples).
pub const MAGNETOMETER_BUFFER_SIZE: usize = 20_000;

/// Light sensor history capacity (samples).
///
/// Light updates far less often than motion, but a matching capacity keeps
/// the combined buffer (sized by the smallest source) from shrinking.
pub const LIGHT_BUFFER_SIZE: usize = 20_000;

// ===== CLASSIFICATION WINDOWS =====

/// Target number of samples per prediction window.
pub const PREDICTION_SAMPLE_SIZE: usize = 80;

/// How many samples to drop per retry when the buffer cannot fill a window.
pub const PREDICTION_STEP_SIZE: usize = 10;

/// Smallest window worth classifying.
///
/// Below this, features such as peak count and standard deviation are too
/// noisy to be meaningful and the tick is skipped instead.
pub const MIN_WINDOW_SIZE: usize = 8;
