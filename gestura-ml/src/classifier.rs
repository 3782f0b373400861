//! Classifier facade
//!
//! Owns the [`Model`] together with the user's current filter set and
//! channel selection, and publishes prediction results.
//!
//! Changing filters or channels invalidates the trained status (the model
//! was fitted on a different feature layout), but the capability is kept so
//! live prediction continues until the user retrains. Live input is
//! therefore assembled with the layout recorded at training time
//! ([`Classifier::predict_live`]), not with the current settings. Changes
//! are refused while a training run is in progress, so a run always
//! completes against the settings it started with. Empty filter sets and
//! empty channel selections are refused outright.

use std::sync::Arc;

use gestura_core::constants::DEFAULT_REQUIRED_CONFIDENCE;
use gestura_core::{ChannelSelection, Store, Subscription};
use serde::{Deserialize, Serialize};

use crate::filters::Filters;
use crate::gesture::{GestureClass, TrainingData};
use crate::input::{ClassifierInput, FeatureLayout};
use crate::model::Model;
use crate::trainer::ModelTrainer;
use crate::{MlError, MlResult};

/// One confidence per trained class, in training order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Confidences(Vec<f32>);

impl Confidences {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Index and value of the highest confidence; first one wins ties
    pub fn best(&self) -> Option<(usize, f32)> {
        self.0
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (index, value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((index, value)),
            })
    }
}

/// Most likely gesture for the last published confidences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPrediction {
    pub class_index: usize,
    pub label: Option<String>,
    pub confidence: f32,
    /// Whether `confidence` reaches the required confidence
    pub meets_threshold: bool,
}

/// Model plus the settings its input is assembled with
pub struct Classifier {
    model: Arc<Model>,
    filters: Store<Filters>,
    selection: Store<ChannelSelection>,
    confidences: Store<Option<Confidences>>,
    best_prediction: Store<Option<BestPrediction>>,
    required_confidence: f32,
    _invalidation: [Subscription; 2],
}

impl Classifier {
    pub fn new(model: Arc<Model>, filters: Filters, selection: ChannelSelection) -> Self {
        let filters = Store::new(filters);
        let selection = Store::new(selection);

        let on_filters = {
            let model = model.clone();
            filters.subscribe(move |_| model.mark_as_untrained())
        };
        let on_selection = {
            let model = model.clone();
            selection.subscribe(move |_| model.mark_as_untrained())
        };

        Self {
            model,
            filters,
            selection,
            confidences: Store::new(None),
            best_prediction: Store::new(None),
            required_confidence: DEFAULT_REQUIRED_CONFIDENCE,
            _invalidation: [on_filters, on_selection],
        }
    }

    pub fn with_required_confidence(mut self, required_confidence: f32) -> Self {
        self.required_confidence = required_confidence;
        self
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn filters(&self) -> Filters {
        self.filters.get()
    }

    pub fn selection(&self) -> ChannelSelection {
        self.selection.get()
    }

    /// Replace the filter set; returns whether it changed
    pub fn set_filters(&self, filters: Filters) -> MlResult<bool> {
        if self.model.is_training() {
            return Err(MlError::TrainingInProgress);
        }
        if filters.is_empty() {
            return Err(MlError::InvalidSettings { reason: "no features are selected" });
        }
        Ok(self.filters.set(filters))
    }

    /// Replace the channel selection; returns whether it changed
    pub fn set_selection(&self, selection: ChannelSelection) -> MlResult<bool> {
        if self.model.is_training() {
            return Err(MlError::TrainingInProgress);
        }
        if !selection.is_valid() {
            return Err(MlError::InvalidSettings { reason: "no sensor channels are selected" });
        }
        Ok(self.selection.set(selection))
    }

    /// Current filters and selection
    pub fn layout(&self) -> FeatureLayout {
        FeatureLayout::new(self.filters(), self.selection())
    }

    /// Feature vector length for the current settings
    pub fn input_len(&self) -> usize {
        self.layout().feature_len()
    }

    /// Train on `gestures` with the current filters and selection
    pub async fn train(&self, trainer: &dyn ModelTrainer, gestures: &[GestureClass]) -> MlResult<()> {
        let layout = self.layout();
        let data = TrainingData::assemble(gestures, &layout.filters, &layout.selection);
        self.model.train(trainer, &data, layout).await
    }

    /// Confidences for `input` assembled with the current settings, without publishing them
    pub async fn predict(&self, input: &dyn ClassifierInput) -> MlResult<Confidences> {
        self.predict_with(input, self.layout()).await
    }

    /// Confidences for `input` assembled the way the current model was trained
    ///
    /// Keeps working after a settings change marks the model untrained.
    pub async fn predict_live(&self, input: &dyn ClassifierInput) -> MlResult<Confidences> {
        self.predict_with(input, self.model.layout()).await
    }

    async fn predict_with(&self, input: &dyn ClassifierInput, layout: FeatureLayout) -> MlResult<Confidences> {
        let features = layout.assemble(input);
        let values = self.model.predict(&features).await?;
        if values.iter().any(|value| !value.is_finite()) {
            return Err(MlError::InvalidPrediction {
                reason: "model returned non-finite confidences",
            });
        }
        Ok(Confidences::new(values))
    }

    /// Publish confidences and the derived best prediction
    pub fn publish(&self, confidences: &Confidences) {
        let best = confidences.best().map(|(class_index, confidence)| BestPrediction {
            class_index,
            label: self.model.labels().get(class_index).cloned(),
            confidence,
            meets_threshold: confidence >= self.required_confidence,
        });
        self.confidences.set(Some(confidences.clone()));
        self.best_prediction.set(best);
    }

    /// Predict and publish
    pub async fn classify(&self, input: &dyn ClassifierInput) -> MlResult<Confidences> {
        let confidences = self.predict(input).await?;
        self.publish(&confidences);
        Ok(confidences)
    }

    pub fn confidences(&self) -> Option<Confidences> {
        self.confidences.get()
    }

    pub fn best_prediction(&self) -> Option<BestPrediction> {
        self.best_prediction.get()
    }

    pub fn subscribe_confidences<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Option<Confidences>) + Send + Sync + 'static,
    {
        self.confidences.subscribe(callback)
    }

    pub fn subscribe_best_prediction<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Option<BestPrediction>) + Send + Sync + 'static,
    {
        self.best_prediction.subscribe(callback)
    }
}
