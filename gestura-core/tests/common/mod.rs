//! Common test utilities for core integration tests
//!
//! This module provides:
//! - A deterministic RNG for synthetic sensor noise
//! - A simulated wearable device that pushes samples into three streams
//!   while advancing a shared mock clock

#![allow(dead_code)]

use std::sync::Arc;

use gestura_core::{
    AccelerometerSample, CombinedLiveData, LightSample, LiveData, MagnetometerSample,
    MockTimeSource, SensorStream, SharedClock,
};

/// Xorshift RNG, reproducible across runs
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16777216.0
    }

    pub fn gen_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Three sensor streams plus the synchronizer, all on one mock clock
pub struct Device {
    pub clock: Arc<MockTimeSource>,
    pub accel: SensorStream<AccelerometerSample>,
    pub magnet: SensorStream<MagnetometerSample>,
    pub light: SensorStream<LightSample>,
    pub combined: CombinedLiveData,
    rng: TestRng,
}

impl Device {
    pub fn new(capacity: usize) -> Self {
        let clock = Arc::new(MockTimeSource::new(1_000));
        let shared: SharedClock = clock.clone();
        let accel = SensorStream::with_clock(capacity, shared.clone());
        let magnet = SensorStream::with_clock(capacity, shared.clone());
        let light = SensorStream::with_clock(capacity, shared.clone());
        let combined = CombinedLiveData::combine_sensors(&accel, &magnet, &light, shared);
        Self {
            clock,
            accel,
            magnet,
            light,
            combined,
            rng: TestRng::new(42),
        }
    }

    /// Push one noisy accelerometer reading, then advance the clock
    pub fn accel_tick(&mut self, step_ms: u64) {
        let sample = AccelerometerSample::new(
            self.rng.gen_range(-0.1, 0.1),
            self.rng.gen_range(-0.1, 0.1),
            1.0 + self.rng.gen_range(-0.05, 0.05),
        );
        self.accel.put(sample).expect("raw streams accept writes");
        self.clock.advance(step_ms);
    }

    /// Simulate the device's real rates: accel every tick, magnet every
    /// second tick, light every fifth
    pub fn run(&mut self, ticks: usize, step_ms: u64) {
        for tick in 0..ticks {
            if tick % 2 == 0 {
                let heading = self.rng.gen_range(-40.0, 40.0);
                self.magnet
                    .put(MagnetometerSample::new(heading, 5.0, -30.0))
                    .expect("raw streams accept writes");
            }
            if tick % 5 == 0 {
                let lux = self.rng.gen_range(0.2, 0.8);
                self.light.put(LightSample::new(lux)).expect("raw streams accept writes");
            }
            self.accel_tick(step_ms);
        }
    }
}
