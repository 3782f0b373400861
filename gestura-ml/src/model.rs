//! Training state machine
//!
//! [`Model`] tracks the training lifecycle and holds the capability produced
//! by the last successful run.
//!
//! ## States
//!
//! | From                        | Event                 | To         |
//! |-----------------------------|-----------------------|------------|
//! | any but InProgress          | `train()`             | InProgress |
//! | InProgress                  | trainer resolves      | Success    |
//! | InProgress                  | trainer rejects       | Failure    |
//! | InProgress                  | run dropped unfinished| Failure    |
//! | Untrained/Success/Failure   | `mark_as_untrained()` | Untrained  |
//!
//! Preconditions are checked synchronously before entering InProgress; a
//! violation fails with `TrainingPrecondition` and changes nothing. A failed
//! run leaves the previous capability in place, and so does
//! `mark_as_untrained()`.
//!
//! ## Observability
//!
//! Every transition publishes a [`ModelData`] snapshot through a
//! [`Store`], so the UI and the polling engine can react without polling.

use std::sync::Arc;

use gestura_core::constants::{MIN_RECORDINGS_PER_CLASS, REQUIRED_CLASS_COUNT};
use gestura_core::{ChannelSelection, Store, Subscription};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gesture::TrainingData;
use crate::input::FeatureLayout;
use crate::trainer::{MlModel, ModelTrainer};
use crate::{MlError, MlResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrainingStatus {
    #[default]
    Untrained,
    InProgress,
    Success,
    Failure,
}

/// Observable snapshot of the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelData {
    pub training_status: TrainingStatus,
    /// Channels used by the last successful run
    pub selection: ChannelSelection,
    pub is_training: bool,
    pub is_trained: bool,
    pub has_model: bool,
}

/// Why a training run was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreconditionFailure {
    #[error("At least {required} gestures are needed, found {found}")]
    TooFewClasses { required: usize, found: usize },

    #[error("No sensor channels are selected")]
    EmptySelection,

    #[error("Gesture '{label}' needs at least {required} recordings, has {found}")]
    TooFewRecordings {
        label: String,
        required: usize,
        found: usize,
    },

    #[error("No features are selected")]
    NoFeatures,
}

/// Minimum amount of data a training run needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingRequirements {
    pub required_classes: usize,
    pub min_recordings_per_class: usize,
}

impl Default for TrainingRequirements {
    fn default() -> Self {
        Self {
            required_classes: REQUIRED_CLASS_COUNT,
            min_recordings_per_class: MIN_RECORDINGS_PER_CLASS,
        }
    }
}

impl TrainingRequirements {
    /// Check `data` and `selection` before a run, in the order the user would fix them
    pub fn check(&self, data: &TrainingData, selection: &ChannelSelection) -> Result<(), PreconditionFailure> {
        if data.num_classes() < self.required_classes {
            return Err(PreconditionFailure::TooFewClasses {
                required: self.required_classes,
                found: data.num_classes(),
            });
        }
        if selection.is_empty() {
            return Err(PreconditionFailure::EmptySelection);
        }
        if let Some(class) = data
            .classes
            .iter()
            .find(|class| class.samples.len() < self.min_recordings_per_class)
        {
            return Err(PreconditionFailure::TooFewRecordings {
                label: class.label.clone(),
                required: self.min_recordings_per_class,
                found: class.samples.len(),
            });
        }
        if data.feature_len() == Some(0) {
            return Err(PreconditionFailure::NoFeatures);
        }
        Ok(())
    }
}

struct ModelState {
    status: TrainingStatus,
    layout: FeatureLayout,
    labels: Vec<String>,
}

/// Training lifecycle plus the last trained capability
pub struct Model {
    requirements: TrainingRequirements,
    state: Mutex<ModelState>,
    capability: Mutex<Option<Arc<dyn MlModel>>>,
    data: Store<ModelData>,
}

impl Model {
    pub fn new(requirements: TrainingRequirements) -> Self {
        Self {
            requirements,
            state: Mutex::new(ModelState {
                status: TrainingStatus::Untrained,
                layout: FeatureLayout::empty(),
                labels: Vec::new(),
            }),
            capability: Mutex::new(None),
            data: Store::new(ModelData::default()),
        }
    }

    pub fn requirements(&self) -> &TrainingRequirements {
        &self.requirements
    }

    /// Run `trainer` on `data`
    ///
    /// `data` must have been assembled with `layout`. On success the
    /// capability is replaced and `layout` recorded; on failure the previous
    /// capability stays. Dropping the returned future before it completes
    /// counts as a failed run.
    pub async fn train(
        &self,
        trainer: &dyn ModelTrainer,
        data: &TrainingData,
        layout: FeatureLayout,
    ) -> MlResult<()> {
        self.requirements.check(data, &layout.selection)?;

        {
            let mut state = self.state.lock();
            if state.status == TrainingStatus::InProgress {
                return Err(MlError::TrainingInProgress);
            }
            state.status = TrainingStatus::InProgress;
        }
        let mut run = TrainingRun { model: self, finished: false };
        self.publish();
        log::info!(
            "Training started: {} classes on channels {}",
            data.num_classes(),
            layout.selection
        );

        let result = trainer.train_model(data).await;
        run.finished = true;

        match result {
            Ok(trained) => {
                *self.capability.lock() = Some(Arc::from(trained));
                {
                    let mut state = self.state.lock();
                    state.status = TrainingStatus::Success;
                    state.layout = layout;
                    state.labels = data.labels();
                }
                self.publish();
                log::info!("Training succeeded");
                Ok(())
            }
            Err(err) => {
                self.state.lock().status = TrainingStatus::Failure;
                self.publish();
                log::warn!("Training failed: {}", err);
                Err(MlError::TrainingFailure(err))
            }
        }
    }

    /// Delegate to the trained capability, whatever the current status
    pub async fn predict(&self, input: &[f32]) -> MlResult<Vec<f32>> {
        let capability = self.capability.lock().clone().ok_or(MlError::NoModel)?;
        capability.predict(input).await
    }

    /// Ask for a retrain without dropping the current capability
    ///
    /// Ignored while a run is in progress; that run decides the next status.
    pub fn mark_as_untrained(&self) {
        {
            let mut state = self.state.lock();
            match state.status {
                TrainingStatus::InProgress => {
                    log::debug!("Ignoring mark_as_untrained while training is in progress");
                    return;
                }
                TrainingStatus::Untrained => return,
                TrainingStatus::Success | TrainingStatus::Failure => {
                    state.status = TrainingStatus::Untrained;
                }
            }
        }
        self.publish();
    }

    pub fn status(&self) -> TrainingStatus {
        self.state.lock().status
    }

    /// Whether the last run succeeded and nothing invalidated it since
    pub fn is_trained(&self) -> bool {
        self.status() == TrainingStatus::Success
    }

    pub fn is_training(&self) -> bool {
        self.status() == TrainingStatus::InProgress
    }

    /// Whether a capability exists; may be true while `is_trained()` is false
    pub fn has_model(&self) -> bool {
        self.capability.lock().is_some()
    }

    /// Channels used by the last successful run
    pub fn selection(&self) -> ChannelSelection {
        self.state.lock().layout.selection
    }

    /// Feature layout of the last successful run
    ///
    /// Live input must be assembled with this layout to match the current
    /// capability, whatever the classifier's settings are now.
    pub fn layout(&self) -> FeatureLayout {
        self.state.lock().layout
    }

    /// Class labels of the last successful run, in confidence order
    pub fn labels(&self) -> Vec<String> {
        self.state.lock().labels.clone()
    }

    /// Feature vector length the current capability expects
    pub fn input_len(&self) -> Option<usize> {
        self.capability.lock().as_ref().map(|model| model.input_len())
    }

    pub fn data(&self) -> ModelData {
        self.data.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ModelData) + Send + Sync + 'static,
    {
        self.data.subscribe(callback)
    }

    fn publish(&self) {
        let has_model = self.has_model();
        let (status, selection) = {
            let state = self.state.lock();
            (state.status, state.layout.selection)
        };
        self.data.set(ModelData {
            training_status: status,
            selection,
            is_training: status == TrainingStatus::InProgress,
            is_trained: status == TrainingStatus::Success,
            has_model,
        });
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(TrainingRequirements::default())
    }
}

/// Resets an abandoned run to Failure
struct TrainingRun<'a> {
    model: &'a Model,
    finished: bool,
}

impl Drop for TrainingRun<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.model.state.lock().status = TrainingStatus::Failure;
            self.model.publish();
            log::warn!("Training run dropped before completion");
        }
    }
}
