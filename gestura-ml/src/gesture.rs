//! Gestures, recordings and training data
//!
//! Gestures and their recordings are owned by the persistence layer; this
//! module only defines their shape and how they become training data.

use gestura_core::{ChannelSelection, CombinedSample};
use serde::{Deserialize, Serialize};

use crate::filters::Filters;
use crate::input::{ClassifierInput, FeatureVector, SeriesInput};

pub type GestureId = u64;

/// One captured example of a gesture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub samples: Vec<CombinedSample>,
}

impl Recording {
    pub fn new(samples: Vec<CombinedSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn input(&self) -> SeriesInput {
        SeriesInput::from_samples(&self.samples)
    }
}

/// A user-defined gesture and its recordings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureClass {
    pub id: GestureId,
    pub name: String,
    pub recordings: Vec<Recording>,
}

impl GestureClass {
    pub fn new(id: GestureId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            recordings: Vec::new(),
        }
    }

    pub fn with_recording(mut self, recording: Recording) -> Self {
        self.recordings.push(recording);
        self
    }

    pub fn add_recording(&mut self, recording: Recording) {
        self.recordings.push(recording);
    }
}

/// Feature vectors of one class
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingClass {
    pub label: String,
    pub samples: Vec<FeatureVector>,
}

/// Everything a trainer sees
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingData {
    pub classes: Vec<TrainingClass>,
}

impl TrainingData {
    /// Reduce every recording with the given filters and selection
    pub fn assemble(gestures: &[GestureClass], filters: &Filters, selection: &ChannelSelection) -> Self {
        let classes = gestures
            .iter()
            .map(|gesture| TrainingClass {
                label: gesture.name.clone(),
                samples: gesture
                    .recordings
                    .iter()
                    .map(|recording| recording.input().get_input(filters, selection))
                    .collect(),
            })
            .collect();
        Self { classes }
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.classes.iter().map(|class| class.label.clone()).collect()
    }

    /// Length of the first feature vector, if any
    pub fn feature_len(&self) -> Option<usize> {
        self.classes
            .iter()
            .flat_map(|class| class.samples.first())
            .map(Vec::len)
            .next()
    }
}
