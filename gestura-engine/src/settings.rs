//! Engine settings
//!
//! [`PollingConfig`] is fixed at startup. [`PredictionSettings`] are user
//! preferences that may change at any time; the engine watches them through
//! a `Store` and rebuilds its timer on change.

use std::time::Duration;

use gestura_core::constants::time::MAX_UPDATES_PER_SECOND;
use gestura_core::constants::{
    DEFAULT_UPDATES_PER_SECOND, MIN_WINDOW_SIZE, MS_PER_SECOND, PREDICTION_SAMPLE_DURATION_MS,
    PREDICTION_SAMPLE_SIZE, PREDICTION_STEP_SIZE,
};
use gestura_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Window search parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Target window size in samples
    pub sample_size: usize,
    /// Samples must be younger than this
    pub sample_duration_ms: u64,
    /// How much to shrink the window per retry
    pub step_size: usize,
    /// Smallest window worth classifying
    pub min_window: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            sample_size: PREDICTION_SAMPLE_SIZE,
            sample_duration_ms: PREDICTION_SAMPLE_DURATION_MS,
            step_size: PREDICTION_STEP_SIZE,
            min_window: MIN_WINDOW_SIZE,
        }
    }
}

impl PollingConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.min_window == 0 {
            return Err(CoreError::InvalidConfig { reason: "min_window must be non-zero" });
        }
        if self.sample_size < self.min_window {
            return Err(CoreError::InvalidConfig { reason: "sample_size is below min_window" });
        }
        if self.step_size == 0 {
            return Err(CoreError::InvalidConfig { reason: "step_size must be non-zero" });
        }
        if self.sample_duration_ms == 0 {
            return Err(CoreError::InvalidConfig { reason: "sample_duration_ms must be non-zero" });
        }
        Ok(())
    }
}

/// User-adjustable prediction preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    pub updates_per_second: u32,
    /// When false the timer is disarmed entirely
    pub automatic_classification: bool,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            updates_per_second: DEFAULT_UPDATES_PER_SECOND,
            automatic_classification: true,
        }
    }
}

impl PredictionSettings {
    /// Timer period; `None` when automatic classification is off
    pub fn interval(&self) -> Option<Duration> {
        if !self.automatic_classification {
            return None;
        }
        let ups = u64::from(self.updates_per_second.clamp(1, MAX_UPDATES_PER_SECOND));
        Some(Duration::from_millis(MS_PER_SECOND / ups))
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.updates_per_second == 0 || self.updates_per_second > MAX_UPDATES_PER_SECOND {
            return Err(CoreError::InvalidConfig {
                reason: "updates_per_second must be between 1 and 100",
            });
        }
        Ok(())
    }
}
