//! Time-Related Constants
//!
//! Intervals and durations used for scheduling predictions.

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// How far back a prediction window may reach (milliseconds).
///
/// Samples older than this are stale for live classification even if the
/// buffer still holds them.
pub const PREDICTION_SAMPLE_DURATION_MS: u64 = 1800;

/// Default prediction rate (predictions per second).
pub const DEFAULT_UPDATES_PER_SECOND: u32 = 10;

/// Upper bound on the prediction rate (predictions per second).
pub const MAX_UPDATES_PER_SECOND: u32 = 100;
