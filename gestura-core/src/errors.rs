//! Error Types for the Signal Pipeline
//!
//! ## Error Categories
//!
//! ### Recoverable
//! - `InsufficientData`: A window request could not be satisfied by the
//!   buffer yet. Callers are expected to retry with a smaller window or
//!   wait for more samples (the polling engine does the former).
//!
//! ### Programming Errors
//! - `UnsupportedOperation`: Writing to a stream whose value is derived
//!   (the synchronized combined stream). This is a defect at the call site,
//!   not a runtime condition to recover from.
//!
//! ### Configuration
//! - `InvalidConfig`: A configuration value can never produce a working
//!   pipeline (zero capacity, zero step size, ...).
//!
//! All variants carry only inline data so the error stays `Copy` and cheap
//! to return from the hot ingestion path.
//!
//! ```rust
//! use gestura_core::{CoreError, RingBuffer};
//!
//! let mut buffer: RingBuffer<f32> = RingBuffer::new(16);
//! buffer.add(1.0);
//!
//! match buffer.window_by_size(4) {
//!     Ok(window) => assert_eq!(window.len(), 4),
//!     Err(CoreError::InsufficientData { required, available }) => {
//!         assert_eq!((required, available), (4, 1));
//!     }
//!     Err(other) => panic!("unexpected: {other}"),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for core pipeline operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Core pipeline errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Not enough buffered samples to satisfy a window request
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Number of samples the window asked for
        required: usize,
        /// Number of samples that qualified
        available: usize,
    },

    /// Operation is not supported by this stream (e.g. writing to derived data)
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// Configuration value can never yield a working pipeline
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration
        reason: &'static str,
    },
}

impl CoreError {
    /// Whether a caller can reasonably retry the operation
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
