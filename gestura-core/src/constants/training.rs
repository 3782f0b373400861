//! Training Preconditions and Prediction Thresholds

/// Minimum number of gesture classes needed to train a classifier.
pub const REQUIRED_CLASS_COUNT: usize = 2;

/// Minimum number of recordings each class needs before training.
pub const MIN_RECORDINGS_PER_CLASS: usize = 3;

/// Confidence a prediction must reach to count as recognized.
pub const DEFAULT_REQUIRED_CONFIDENCE: f32 = 0.8;
