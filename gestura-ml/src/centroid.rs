//! Nearest-centroid trainer
//!
//! A deliberately small built-in trainer. Training:
//!
//! 1. z-score normalises every feature over the whole training set
//!    (features with zero spread keep a scale of 1),
//! 2. averages the normalised vectors of each class into a centroid.
//!
//! Prediction normalises the input the same way and returns a softmax over
//! the negative squared distances to each centroid:
//!
//! ```text
//! p_k = exp(-d_k / T) / Σ_j exp(-d_j / T)
//! ```
//!
//! Lower temperatures `T` make the distribution sharper. The output always
//! sums to 1 for finite input.

use async_trait::async_trait;

use crate::gesture::TrainingData;
use crate::trainer::{MlModel, ModelTrainer};
use crate::{MlError, MlResult, TrainerError};

/// Features whose spread falls below this are left unscaled
const MIN_SCALE: f32 = 1e-6;

/// Configuration for the centroid trainer
#[derive(Debug, Clone, Copy)]
pub struct CentroidConfig {
    /// Softmax temperature
    pub temperature: f32,
}

impl Default for CentroidConfig {
    fn default() -> Self {
        Self { temperature: 1.0 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CentroidTrainer {
    config: CentroidConfig,
}

impl CentroidTrainer {
    pub fn new(config: CentroidConfig) -> Self {
        Self { config }
    }

    /// Train synchronously; the async trait method wraps this
    pub fn fit(&self, data: &TrainingData) -> Result<CentroidModel, TrainerError> {
        let input_len = validate(data)?;
        let all: Vec<&Vec<f32>> = data.classes.iter().flat_map(|class| class.samples.iter()).collect();
        let count = all.len() as f32;

        let mut means = vec![0.0f32; input_len];
        for sample in &all {
            for (mean, value) in means.iter_mut().zip(sample.iter()) {
                *mean += value / count;
            }
        }

        let mut scales = vec![0.0f32; input_len];
        for sample in &all {
            for ((scale, mean), value) in scales.iter_mut().zip(&means).zip(sample.iter()) {
                *scale += (value - mean) * (value - mean) / count;
            }
        }
        for scale in &mut scales {
            let std = libm::sqrtf(*scale);
            *scale = if std > MIN_SCALE { std } else { 1.0 };
        }

        let centroids = data
            .classes
            .iter()
            .map(|class| {
                let n = class.samples.len() as f32;
                let mut centroid = vec![0.0f32; input_len];
                for sample in &class.samples {
                    for (i, value) in sample.iter().enumerate() {
                        centroid[i] += (value - means[i]) / scales[i] / n;
                    }
                }
                centroid
            })
            .collect();

        Ok(CentroidModel {
            means,
            scales,
            centroids,
            temperature: self.config.temperature.max(MIN_SCALE),
        })
    }
}

fn validate(data: &TrainingData) -> Result<usize, TrainerError> {
    let expected = data.feature_len().ok_or(TrainerError::NoClasses)?;
    if expected == 0 {
        return Err(TrainerError::Rejected("feature vectors are empty".into()));
    }
    for class in &data.classes {
        if class.samples.is_empty() {
            return Err(TrainerError::EmptyClass { label: class.label.clone() });
        }
        if let Some(sample) = class.samples.iter().find(|sample| sample.len() != expected) {
            return Err(TrainerError::InconsistentFeatures {
                label: class.label.clone(),
                expected,
                actual: sample.len(),
            });
        }
    }
    Ok(expected)
}

#[async_trait]
impl ModelTrainer for CentroidTrainer {
    async fn train_model(&self, data: &TrainingData) -> Result<Box<dyn MlModel>, TrainerError> {
        let model = self.fit(data)?;
        log::debug!(
            "Centroid model fitted: {} classes, {} features",
            model.centroids.len(),
            model.means.len()
        );
        Ok(Box::new(model))
    }
}

/// Model produced by [`CentroidTrainer`]
#[derive(Debug, Clone)]
pub struct CentroidModel {
    means: Vec<f32>,
    scales: Vec<f32>,
    centroids: Vec<Vec<f32>>,
    temperature: f32,
}

impl CentroidModel {
    /// Class confidences for `input`
    pub fn confidences(&self, input: &[f32]) -> MlResult<Vec<f32>> {
        if input.len() != self.means.len() {
            return Err(MlError::InputShape {
                expected: self.means.len(),
                actual: input.len(),
            });
        }

        let normalized: Vec<f32> = input
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect();

        let logits: Vec<f32> = self
            .centroids
            .iter()
            .map(|centroid| {
                let distance: f32 = centroid
                    .iter()
                    .zip(&normalized)
                    .map(|(c, v)| (c - v) * (c - v))
                    .sum();
                -distance / self.temperature
            })
            .collect();

        Ok(softmax(&logits))
    }
}

#[async_trait]
impl MlModel for CentroidModel {
    async fn predict(&self, input: &[f32]) -> MlResult<Vec<f32>> {
        self.confidences(input)
    }

    fn num_classes(&self) -> usize {
        self.centroids.len()
    }

    fn input_len(&self) -> usize {
        self.means.len()
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|logit| libm::expf(logit - max)).collect();
    let total: f32 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}
