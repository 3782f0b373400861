//! Trainer and model capabilities
//!
//! Both are opaque to the rest of the pipeline: a trainer resolves with a
//! usable model or rejects, and a model maps a feature vector to one
//! confidence per class.

use async_trait::async_trait;

use crate::gesture::TrainingData;
use crate::{MlResult, TrainerError};

/// Trained predictive capability
#[async_trait]
pub trait MlModel: Send + Sync {
    /// One confidence per class, in training class order
    async fn predict(&self, input: &[f32]) -> MlResult<Vec<f32>>;

    fn num_classes(&self) -> usize;

    /// Feature vector length the model was trained on
    fn input_len(&self) -> usize;
}

/// Produces a model from training data
#[async_trait]
pub trait ModelTrainer: Send + Sync {
    async fn train_model(&self, data: &TrainingData) -> Result<Box<dyn MlModel>, TrainerError>;
}
