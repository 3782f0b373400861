//! Buffer configuration
//!
//! Read-only values fixed at process start. Loading them from disk is the
//! embedding application's business; this crate only defines the shape,
//! the defaults, and validation.

use crate::constants::{ACCELEROMETER_BUFFER_SIZE, LIGHT_BUFFER_SIZE, MAGNETOMETER_BUFFER_SIZE};
use crate::errors::{CoreError, CoreResult};

/// Ring buffer capacity for each sensor stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferConfig {
    /// Accelerometer history capacity (samples)
    pub accelerometer_capacity: usize,
    /// Magnetometer history capacity (samples)
    pub magnetometer_capacity: usize,
    /// Light sensor history capacity (samples)
    pub light_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            accelerometer_capacity: ACCELEROMETER_BUFFER_SIZE,
            magnetometer_capacity: MAGNETOMETER_BUFFER_SIZE,
            light_capacity: LIGHT_BUFFER_SIZE,
        }
    }
}

impl BufferConfig {
    /// Capacity of the synchronized buffer: the smallest source capacity
    pub fn combined_capacity(&self) -> usize {
        self.accelerometer_capacity
            .min(self.magnetometer_capacity)
            .min(self.light_capacity)
    }

    /// Reject capacities that leave the combined buffer empty
    pub fn validate(&self) -> CoreResult<()> {
        if self.combined_capacity() == 0 {
            return Err(CoreError::InvalidConfig {
                reason: "buffer capacities must be non-zero",
            });
        }
        Ok(())
    }
}
