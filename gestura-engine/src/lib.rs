//! Polling Prediction Engine and Runtime Wiring
//!
//! ## Overview
//!
//! The engine closes the loop between live sensor data and the classifier.
//! On a fixed interval it draws a window from the synchronized sensor
//! buffer, assembles a feature vector with the classifier's current
//! settings, and publishes the resulting confidences.
//!
//! ## Tick Gating
//!
//! A tick does nothing unless **all** of these hold:
//! - the engine is running (`start()` / `stop()` toggle this without
//!   touching the timer),
//! - the classifier has a trained capability (not necessarily a current
//!   one: a model marked untrained keeps predicting),
//! - no training run is in progress.
//!
//! ## Window Search
//!
//! Early in a session, or after the device stalls, the buffer may not hold
//! a full window. The engine then retries with smaller windows:
//!
//! ```text
//! requested 20, step 4, floor 8, buffer holds 10
//!   try 20 ✗ (10 available)
//!   try 16 ✗
//!   try 12 ✗
//!   try 10 ✓   never below what is available, never below the floor
//! ```
//!
//! Exhausting the floor skips the tick with `WindowUnavailable`; the engine
//! keeps running.
//!
//! ## Failure Policy
//!
//! Nothing inside a tick can stop the scheduler. Window errors skip the
//! tick, prediction errors are published as [`PredictionOutcome::Failed`]
//! and counted in [`EngineStats`]. A model that panics is reported the same
//! way as one that returns a non-finite prediction.
//!
//! ## Runtime
//!
//! [`GestureRuntime`] builds every component once from a [`RuntimeConfig`]
//! and hands out references. There is no global instance.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gestura_engine::{GestureRuntime, RuntimeConfig};
//! use gestura_core::{AccelerometerSample, LiveData};
//!
//! # async fn run() -> Result<(), gestura_engine::EngineError> {
//! let runtime = GestureRuntime::new(RuntimeConfig::default())?;
//!
//! // Transport layer pushes readings as they arrive
//! runtime.accelerometer().put(AccelerometerSample::new(0.0, 0.0, 1.0))?;
//!
//! let _subscription = runtime.engine().subscribe_outcomes(|outcome| {
//!     println!("{:?}", outcome);
//! });
//! # Ok(())
//! # }
//! ```

pub mod polling;
pub mod runtime;
pub mod settings;

// Re-export common types
pub use polling::{search_window, EngineStats, PollingEngine, PredictionOutcome, WindowFetch};
pub use runtime::{GestureRuntime, RuntimeConfig};
pub use settings::{PollingConfig, PredictionSettings};

use gestura_core::CoreError;
use gestura_ml::MlError;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Window search went down to the floor without success
    #[error("No usable window: tried sizes {attempts:?}")]
    WindowUnavailable { attempts: Vec<usize> },

    /// The engine timer needs a tokio runtime
    #[error("No tokio runtime available to drive the polling timer")]
    NoRuntime,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Ml(#[from] MlError),
}

pub type EngineResult<T> = Result<T, EngineError>;
