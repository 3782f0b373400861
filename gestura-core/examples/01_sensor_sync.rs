//! Sensor Synchronization Example
//!
//! This example shows how three sensors that report at different rates are
//! merged into one combined stream, and how a prediction window is cut from
//! the combined history.
//!
//! ## What You'll Learn
//!
//! - Feeding per-sensor streams
//! - Last-value hold in the combined stream
//! - Duration-bounded windows and underrun errors
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_sensor_sync
//! ```

use std::sync::Arc;

use gestura_core::{
    AccelerometerSample, CombinedLiveData, CoreError, LightSample, LiveData, MagnetometerSample,
    MockTimeSource, SensorStream, SharedClock,
};

fn main() {
    println!("Gestura Sensor Synchronization Example");
    println!("======================================\n");

    // A mock clock keeps the timestamps readable
    let clock = Arc::new(MockTimeSource::new(0));
    let shared: SharedClock = clock.clone();

    let accel = SensorStream::with_clock(256, shared.clone());
    let magnet = SensorStream::with_clock(256, shared.clone());
    let light = SensorStream::with_clock(256, shared.clone());
    let combined = CombinedLiveData::combine_sensors(&accel, &magnet, &light, shared);

    let _printer = combined.subscribe(|sample| {
        println!(
            "  combined: acc=({:+.2}, {:+.2}, {:+.2}) mag=({:+.1}, {:+.1}, {:+.1}) light={:.2}",
            sample.accx, sample.accy, sample.accz, sample.magx, sample.magy, sample.magz, sample.light
        );
    });

    // Accelerometer every 20 ms, magnetometer every 40 ms, light every 100 ms
    println!("Streaming 10 accelerometer ticks...\n");
    for tick in 0..10u32 {
        let phase = tick as f32 * 0.6;
        put_or_report(&accel, AccelerometerSample::new(phase.sin(), phase.cos(), 1.0));
        if tick % 2 == 0 {
            put_or_report(&magnet, MagnetometerSample::new(22.0, -4.0 + tick as f32, 40.0));
        }
        if tick % 5 == 0 {
            put_or_report(&light, LightSample::new(0.3 + tick as f32 * 0.05));
        }
        clock.advance(20);
    }

    let buffer = combined.buffer();
    println!("\nCombined buffer holds {} samples (10 + 5 + 2 updates)\n", buffer.len());

    println!("Cutting windows from the last 100 ms:");
    for size in [4, 8, 16] {
        match buffer.window_by_duration(100, size) {
            Ok(window) => {
                let first = window.first().map(|s| s.timestamp).unwrap_or_default();
                println!("  {:>2} samples: ok, oldest at {} ms", size, first);
            }
            Err(CoreError::InsufficientData { required, available }) => {
                println!("  {:>2} samples: only {} of {} fresh", size, available, required);
            }
            Err(e) => println!("  {:>2} samples: {}", size, e),
        }
    }
    drop(buffer);

    println!("\nDerived streams reject writes:");
    if let Err(e) = combined.put(Default::default()) {
        println!("  {}", e);
    }

    combined.dispose();
    println!("\nAfter dispose the accelerometer has {} listeners", accel.subscriber_count());
}

fn put_or_report<T: gestura_core::SensorSample>(stream: &SensorStream<T>, value: T) {
    if let Err(e) = stream.put(value) {
        println!("  write failed: {}", e);
    }
}
