//! Common fixtures for ML integration tests
//!
//! Synthetic gestures with seeded noise:
//! - `Still`: device at rest, gravity on z
//! - `Shake`: fast oscillation along x
//! - `Tilt`: gravity rotating from z onto y

#![allow(dead_code)]

use std::sync::Arc;

use gestura_core::{
    AccelerometerSample, CombinedLiveData, CombinedSample, LightSample, LiveData,
    MagnetometerSample, MockTimeSource, SensorStream, SharedClock,
};
use gestura_ml::{GestureClass, Recording};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const RECORDING_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Still,
    Shake,
    Tilt,
}

impl Motion {
    pub const ALL: [Motion; 3] = [Motion::Still, Motion::Shake, Motion::Tilt];

    pub fn name(&self) -> &'static str {
        match self {
            Motion::Still => "still",
            Motion::Shake => "shake",
            Motion::Tilt => "tilt",
        }
    }

    /// Accelerometer reading at step `i` of `len`
    pub fn accel(&self, i: usize, len: usize, rng: &mut StdRng) -> AccelerometerSample {
        let noise = |rng: &mut StdRng| -> f32 { rng.gen_range(-0.05..0.05) };
        let t = i as f32 / len as f32;
        match self {
            Motion::Still => AccelerometerSample::new(noise(rng), noise(rng), 1.0 + noise(rng)),
            Motion::Shake => {
                let swing = if (i / 4) % 2 == 0 { 1.8 } else { -1.8 };
                AccelerometerSample::new(swing + noise(rng), noise(rng), 1.0 + noise(rng))
            }
            Motion::Tilt => AccelerometerSample::new(
                noise(rng),
                t + noise(rng),
                1.0 - t + noise(rng),
            ),
        }
    }
}

pub struct GestureFactory {
    rng: StdRng,
}

impl GestureFactory {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn recording(&mut self, motion: Motion, len: usize) -> Recording {
        let samples = (0..len)
            .map(|i| {
                let accel = motion.accel(i, len, &mut self.rng);
                let magnet = MagnetometerSample::new(
                    self.rng.gen_range(-30.0..30.0),
                    self.rng.gen_range(-30.0..30.0),
                    -40.0,
                );
                CombinedSample::from_parts(&accel, &magnet, &LightSample::new(0.5))
            })
            .collect();
        Recording::new(samples)
    }

    /// One gesture per motion, `recordings` each
    pub fn gestures(&mut self, motions: &[Motion], recordings: usize) -> Vec<GestureClass> {
        motions
            .iter()
            .enumerate()
            .map(|(id, motion)| {
                let mut gesture = GestureClass::new(id as u64, motion.name());
                for _ in 0..recordings {
                    gesture.add_recording(self.recording(*motion, RECORDING_LEN));
                }
                gesture
            })
            .collect()
    }
}

/// Sensor streams plus synchronizer on a mock clock
pub struct LiveDevice {
    pub clock: Arc<MockTimeSource>,
    pub accel: SensorStream<AccelerometerSample>,
    pub magnet: SensorStream<MagnetometerSample>,
    pub light: SensorStream<LightSample>,
    pub combined: CombinedLiveData,
    rng: StdRng,
}

impl LiveDevice {
    pub fn new(capacity: usize) -> Self {
        let clock = Arc::new(MockTimeSource::new(0));
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
            rng: StdRng::seed_from_u64(7),
        }
    }

    /// Perform `motion` for `len` accelerometer readings, 20 ms apart
    pub fn perform(&mut self, motion: Motion, len: usize) {
        self.magnet
            .put(MagnetometerSample::new(0.0, 10.0, -40.0))
            .expect("raw streams accept writes");
        self.light.put(LightSample::new(0.5)).expect("raw streams accept writes");
        for i in 0..len {
            let sample = motion.accel(i, len, &mut self.rng);
            self.accel.put(sample).expect("raw streams accept writes");
            self.clock.advance(20);
        }
    }
}
