//! Feature extraction, training lifecycle and classification
//!
//! ## Overview
//!
//! This crate turns windows of synchronized sensor samples into feature
//! vectors and drives a gesture classifier over them:
//!
//! ```text
//! window of CombinedSample ──► SeriesInput ──► Filters per channel ──► FeatureVector
//!                                                                          │
//!                   Model (training state machine + trained capability) ◄──┘
//!                                          │
//!                            Confidences ──► BestPrediction
//! ```
//!
//! ## Feature Layout
//!
//! A feature vector is laid out channel-major: for each selected channel in
//! canonical order (accel x/y/z, magnet x/y/z, light), every enabled filter
//! in canonical order. Its length is `channels × filters`, and two calls on
//! the same data always produce the same vector.
//!
//! ## Training Lifecycle
//!
//! ```text
//!            train()                trainer resolves
//! Untrained ─────────► InProgress ───────────────────► Success
//!     ▲                    │                              │
//!     │                    └──── trainer rejects ──► Failure
//!     └──────────── mark_as_untrained() ─────────────────┘
//! ```
//!
//! The trained capability is held apart from the status. Marking the model
//! untrained (for example after a channel selection change) keeps the last
//! successful capability, so prediction continues while the status asks for
//! a retrain. `is_trained()` and `has_model()` are therefore distinct.
//!
//! ## Trainer Capability
//!
//! Training is delegated to an async [`ModelTrainer`]. The crate ships
//! [`CentroidTrainer`], a small nearest-centroid classifier that is enough
//! for distinct gestures and for tests; heavier trainers plug in behind the
//! same trait.
//!
//! ## Example Usage
//!
//! ```rust
//! use gestura_ml::{FilterKind, Filters, ClassifierInput, SeriesInput};
//! use gestura_core::{ChannelSelection, CombinedSample};
//!
//! let samples: Vec<CombinedSample> = (0..10)
//!     .map(|i| CombinedSample { accx: i as f32, ..Default::default() })
//!     .collect();
//!
//! let filters = Filters::from_kinds([FilterKind::Max, FilterKind::Min]);
//! let selection = ChannelSelection::from_sensors(true, false, false);
//! let features = SeriesInput::from_samples(&samples).get_input(&filters, &selection);
//!
//! // accx max, accx min, accy max, accy min, accz max, accz min
//! assert_eq!(features, vec![9.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
//! ```

pub mod centroid;
pub mod classifier;
pub mod filters;
pub mod gesture;
pub mod input;
pub mod model;
pub mod trainer;

// Re-export main types
pub use centroid::{CentroidConfig, CentroidModel, CentroidTrainer};
pub use classifier::{BestPrediction, Classifier, Confidences};
pub use filters::{FilterKind, Filters, GraphLimits};
pub use gesture::{GestureClass, GestureId, Recording, TrainingClass, TrainingData};
pub use input::{AccelerometerInput, ClassifierInput, FeatureLayout, FeatureVector, SeriesInput};
pub use model::{Model, ModelData, PreconditionFailure, TrainingRequirements, TrainingStatus};
pub use trainer::{MlModel, ModelTrainer};

use thiserror::Error;

/// Errors raised by a trainer capability
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrainerError {
    #[error("No classes to train on")]
    NoClasses,

    #[error("Class '{label}' has no samples")]
    EmptyClass { label: String },

    #[error("Inconsistent feature length in class '{label}': expected {expected}, got {actual}")]
    InconsistentFeatures {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("Trainer rejected the data: {0}")]
    Rejected(String),
}

/// Classification and training errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MlError {
    /// Prediction requested before any training run succeeded
    #[error("Cannot predict, no model has been trained")]
    NoModel,

    /// Training refused up front; nothing changed
    #[error("Training precondition failed: {0}")]
    TrainingPrecondition(#[from] PreconditionFailure),

    /// A training run is already in flight
    #[error("Training is already in progress")]
    TrainingInProgress,

    /// The trainer rejected the data; the previous model is kept
    #[error("Training failed: {0}")]
    TrainingFailure(#[from] TrainerError),

    /// Model produced unusable output (NaN or infinite confidences)
    #[error("Invalid prediction: {reason}")]
    InvalidPrediction { reason: &'static str },

    /// Settings that can never produce a feature vector
    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: &'static str },

    /// Feature vector does not match what the model was trained on
    #[error("Input shape mismatch: model expects {expected} features, got {actual}")]
    InputShape { expected: usize, actual: usize },
}

impl MlError {
    /// Errors the user can act on by changing gestures or settings
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::TrainingPrecondition(_)
                | Self::TrainingFailure(_)
                | Self::NoModel
                | Self::InvalidSettings { .. }
        )
    }
}

/// Result type for ML operations
pub type MlResult<T> = Result<T, MlError>;
