//! Process-wide component wiring
//!
//! Builds the sensor streams, the synchronizer, the classifier and the
//! polling engine once, in dependency order, and hands out references.
//! Callers that need a second pipeline (tests, replays) simply build a
//! second runtime.

use std::sync::Arc;

use gestura_core::{
    AccelerometerSample, BufferConfig, ChannelSelection, CombinedLiveData, LightSample,
    MagnetometerSample, MonotonicTime, SensorStream, SharedClock, Store,
};
use gestura_ml::{Classifier, Filters, Model, TrainingRequirements};
use serde::{Deserialize, Serialize};

use crate::polling::PollingEngine;
use crate::settings::{PollingConfig, PredictionSettings};
use crate::EngineResult;

/// Everything needed to build a [`GestureRuntime`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub buffers: BufferConfig,
    pub polling: PollingConfig,
    pub prediction: PredictionSettings,
    pub training: TrainingRequirements,
    pub filters: Filters,
    pub selection: ChannelSelection,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            buffers: BufferConfig::default(),
            polling: PollingConfig::default(),
            prediction: PredictionSettings::default(),
            training: TrainingRequirements::default(),
            filters: Filters::default(),
            selection: ChannelSelection::from_sensors(true, false, false),
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> EngineResult<()> {
        self.buffers.validate()?;
        self.polling.validate()?;
        self.prediction.validate()?;
        Ok(())
    }
}

/// The assembled pipeline
pub struct GestureRuntime {
    accelerometer: SensorStream<AccelerometerSample>,
    magnetometer: SensorStream<MagnetometerSample>,
    light: SensorStream<LightSample>,
    combined: Arc<CombinedLiveData>,
    classifier: Arc<Classifier>,
    settings: Store<PredictionSettings>,
    engine: PollingEngine,
}

impl GestureRuntime {
    /// Build on the current tokio runtime with a monotonic clock
    pub fn new(config: RuntimeConfig) -> EngineResult<Self> {
        Self::with_clock(config, MonotonicTime::shared())
    }

    pub fn with_clock(config: RuntimeConfig, clock: SharedClock) -> EngineResult<Self> {
        config.validate()?;

        let accelerometer = SensorStream::with_clock(config.buffers.accelerometer_capacity, clock.clone());
        let magnetometer = SensorStream::with_clock(config.buffers.magnetometer_capacity, clock.clone());
        let light = SensorStream::with_clock(config.buffers.light_capacity, clock.clone());
        let combined = Arc::new(CombinedLiveData::combine_sensors(
            &accelerometer,
            &magnetometer,
            &light,
            clock,
        ));

        let model = Arc::new(Model::new(config.training));
        let classifier = Arc::new(Classifier::new(model, config.filters, config.selection));

        let settings = Store::new(config.prediction);
        let engine = PollingEngine::spawn(classifier.clone(), combined.clone(), &settings, config.polling)?;

        log::info!(
            "Gesture runtime ready: {} channels, {} filters, {} predictions/s",
            config.selection.len(),
            config.filters.len(),
            config.prediction.updates_per_second
        );

        Ok(Self {
            accelerometer,
            magnetometer,
            light,
            combined,
            classifier,
            settings,
            engine,
        })
    }

    pub fn accelerometer(&self) -> &SensorStream<AccelerometerSample> {
        &self.accelerometer
    }

    pub fn magnetometer(&self) -> &SensorStream<MagnetometerSample> {
        &self.magnetometer
    }

    pub fn light(&self) -> &SensorStream<LightSample> {
        &self.light
    }

    pub fn combined(&self) -> &Arc<CombinedLiveData> {
        &self.combined
    }

    pub fn classifier(&self) -> &Arc<Classifier> {
        &self.classifier
    }

    /// User prediction settings; writes retune the engine
    pub fn settings(&self) -> &Store<PredictionSettings> {
        &self.settings
    }

    pub fn engine(&self) -> &PollingEngine {
        &self.engine
    }

    /// Stop the engine and unhook the synchronizer from the sensor streams
    pub fn shutdown(&self) {
        self.engine.shutdown();
        self.combined.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use gestura_core::{CoreError, LiveData};

    #[test]
    fn engine_requires_a_tokio_runtime() {
        let result = GestureRuntime::new(RuntimeConfig::default());
        assert!(matches!(result, Err(EngineError::NoRuntime)));
    }

    #[test]
    fn invalid_config_is_rejected_before_wiring() {
        let config = RuntimeConfig {
            polling: PollingConfig { step_size: 0, ..PollingConfig::default() },
            ..RuntimeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::Core(CoreError::InvalidConfig { .. }))
        ));
    }

    #[tokio::test]
    async fn wires_streams_into_combined_buffer() {
        let config = RuntimeConfig {
            buffers: BufferConfig {
                accelerometer_capacity: 64,
                magnetometer_capacity: 32,
                light_capacity: 16,
            },
            ..RuntimeConfig::default()
        };
        let runtime = GestureRuntime::new(config).unwrap();
        assert_eq!(runtime.combined().buffer().capacity(), 16);

        runtime.accelerometer().put(AccelerometerSample::new(0.0, 0.0, 1.0)).unwrap();
        runtime.light().put(LightSample::new(0.7)).unwrap();
        assert_eq!(runtime.combined().buffer().len(), 2);
        assert_eq!(runtime.combined().latest().light, 0.7);

        runtime.shutdown();
        runtime.shutdown();
        assert!(runtime.engine().is_shut_down());
        assert_eq!(runtime.accelerometer().subscriber_count(), 0);
        assert_eq!(runtime.settings().subscriber_count(), 0);
    }
}
