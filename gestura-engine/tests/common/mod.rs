//! Common fixtures for engine integration tests
//!
//! Builds a runtime on a mock sample clock, synthesizes gestures with a
//! seeded RNG, and provides trainers with controllable timing.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gestura_core::{
    AccelerometerSample, CombinedSample, LightSample, LiveData, MagnetometerSample,
    MockTimeSource, SharedClock,
};
use gestura_engine::{GestureRuntime, RuntimeConfig};
use gestura_ml::{
    CentroidTrainer, GestureClass, MlModel, MlResult, ModelTrainer, Recording, TrainerError,
    TrainingData,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Notify;

pub const RECORDING_LEN: usize = 80;

/// Runtime whose sample timestamps come from a mock clock
pub fn runtime() -> (GestureRuntime, Arc<MockTimeSource>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let clock = Arc::new(MockTimeSource::new(0));
    let shared: SharedClock = clock.clone();
    let runtime = GestureRuntime::with_clock(RuntimeConfig::default(), shared)
        .expect("default config is valid");
    (runtime, clock)
}

fn reading(shaking: bool, i: usize, rng: &mut StdRng) -> AccelerometerSample {
    let swing = if (i / 3) % 2 == 0 { 1.5 } else { -1.5 };
    let x = if shaking { swing } else { 0.0 };
    AccelerometerSample::new(
        x + rng.gen_range(-0.05..0.05),
        rng.gen_range(-0.05..0.05),
        1.0 + rng.gen_range(-0.05..0.05),
    )
}

/// "rest" and "shake", three recordings each
pub fn gestures(seed: u64) -> Vec<GestureClass> {
    let mut rng = StdRng::seed_from_u64(seed);
    ["rest", "shake"]
        .iter()
        .enumerate()
        .map(|(id, name)| {
            let mut gesture = GestureClass::new(id as u64, *name);
            for _ in 0..3 {
                let samples = (0..RECORDING_LEN)
                    .map(|i| {
                        let accel = reading(id == 1, i, &mut rng);
                        CombinedSample::from_parts(&accel, &MagnetometerSample::default(), &LightSample::default())
                    })
                    .collect();
                gesture.add_recording(Recording::new(samples));
            }
            gesture
        })
        .collect()
}

/// Push `count` accelerometer readings, 20 ms apart on the sample clock
pub fn feed(runtime: &GestureRuntime, clock: &MockTimeSource, shaking: bool, count: usize) {
    let mut rng = StdRng::seed_from_u64(99);
    for i in 0..count {
        runtime
            .accelerometer()
            .put(reading(shaking, i, &mut rng))
            .expect("raw streams accept writes");
        clock.advance(20);
    }
}

pub async fn train(runtime: &GestureRuntime) {
    runtime
        .classifier()
        .train(&CentroidTrainer::default(), &gestures(5))
        .await
        .expect("training succeeds");
}

/// Trainer that waits for a signal before delegating to the centroid trainer
pub struct GatedTrainer {
    pub gate: Arc<Notify>,
}

#[async_trait]
impl ModelTrainer for GatedTrainer {
    async fn train_model(&self, data: &TrainingData) -> Result<Box<dyn MlModel>, TrainerError> {
        self.gate.notified().await;
        CentroidTrainer::default().train_model(data).await
    }
}

/// Model that takes `delay` to answer
pub struct SlowModel {
    pub delay: Duration,
    pub inner: Box<dyn MlModel>,
}

#[async_trait]
impl MlModel for SlowModel {
    async fn predict(&self, input: &[f32]) -> MlResult<Vec<f32>> {
        tokio::time::sleep(self.delay).await;
        self.inner.predict(input).await
    }

    fn num_classes(&self) -> usize {
        self.inner.num_classes()
    }

    fn input_len(&self) -> usize {
        self.inner.input_len()
    }
}

pub struct SlowTrainer {
    pub delay: Duration,
}

#[async_trait]
impl ModelTrainer for SlowTrainer {
    async fn train_model(&self, data: &TrainingData) -> Result<Box<dyn MlModel>, TrainerError> {
        let inner = CentroidTrainer::default().train_model(data).await?;
        Ok(Box::new(SlowModel { delay: self.delay, inner }))
    }
}

/// How a [`FaultyModel`] misbehaves
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Nan,
    Panic,
}

/// Model that fails every prediction in a fixed way
pub struct FaultyModel {
    pub fault: Fault,
    pub inner: Box<dyn MlModel>,
}

#[async_trait]
impl MlModel for FaultyModel {
    async fn predict(&self, input: &[f32]) -> MlResult<Vec<f32>> {
        match self.fault {
            Fault::Nan => Ok(vec![f32::NAN; self.inner.num_classes()]),
            Fault::Panic => panic!("model crashed on {} features", input.len()),
        }
    }

    fn num_classes(&self) -> usize {
        self.inner.num_classes()
    }

    fn input_len(&self) -> usize {
        self.inner.input_len()
    }
}

pub struct FaultyTrainer {
    pub fault: Fault,
}

#[async_trait]
impl ModelTrainer for FaultyTrainer {
    async fn train_model(&self, data: &TrainingData) -> Result<Box<dyn MlModel>, TrainerError> {
        let inner = CentroidTrainer::default().train_model(data).await?;
        Ok(Box::new(FaultyModel { fault: self.fault, inner }))
    }
}
