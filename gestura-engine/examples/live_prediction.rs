//! Live Prediction Example
//!
//! Simulates a device streaming accelerometer data, records two gestures,
//! trains the centroid classifier and lets the polling engine classify the
//! live stream.
//!
//! ## Running the Example
//!
//! ```bash
//! RUST_LOG=info cargo run --example live_prediction
//! ```

use std::time::Duration;

use gestura_core::{
    AccelerometerSample, CombinedSample, LightSample, LiveData, MagnetometerSample,
};
use gestura_engine::{GestureRuntime, PredictionOutcome, RuntimeConfig};
use gestura_ml::{CentroidTrainer, GestureClass, Recording};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RECORDING_LEN: usize = 80;

/// Slow wobble for "wave", fast alternation for "shake", flat for "rest"
fn motion(gesture: usize, i: usize, rng: &mut StdRng) -> AccelerometerSample {
    let t = i as f32;
    let (x, y) = match gesture {
        1 => ((t * 0.2).sin() * 0.8, (t * 0.2).cos() * 0.4),
        2 => (if (i / 3) % 2 == 0 { 1.5 } else { -1.5 }, 0.0),
        _ => (0.0, 0.0),
    };
    let mut noise = || -> f32 { rng.gen_range(-0.05..0.05) };
    AccelerometerSample::new(x + noise(), y + noise(), 1.0 + noise())
}

fn record(names: &[&str], rng: &mut StdRng) -> Vec<GestureClass> {
    names
        .iter()
        .enumerate()
        .map(|(id, name)| {
            let mut gesture = GestureClass::new(id as u64, *name);
            for _ in 0..4 {
                let samples = (0..RECORDING_LEN)
                    .map(|i| {
                        CombinedSample::from_parts(
                            &motion(id, i, rng),
                            &MagnetometerSample::default(),
                            &LightSample::default(),
                        )
                    })
                    .collect();
                gesture.add_recording(Recording::new(samples));
            }
            gesture
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Gestura Live Prediction Example ===\n");

    let runtime = GestureRuntime::new(RuntimeConfig::default())?;
    let mut rng = StdRng::seed_from_u64(7);

    let gestures = record(&["rest", "wave", "shake"], &mut rng);
    runtime.classifier().train(&CentroidTrainer::default(), &gestures).await?;
    println!("Trained on {} gestures: {:?}\n", gestures.len(), runtime.classifier().model().labels());

    let _printer = runtime.engine().subscribe_outcomes(|outcome| match outcome {
        PredictionOutcome::Predicted(confidences) => {
            let rendered: Vec<String> = confidences.as_slice().iter().map(|c| format!("{:.2}", c)).collect();
            println!("  confidences [{}]", rendered.join(", "));
        }
        PredictionOutcome::Failed(e) => println!("  prediction failed: {}", e),
    });

    // Perform each gesture for two seconds at 50 Hz
    for (id, name) in ["rest", "wave", "shake"].iter().enumerate() {
        println!("Performing '{}'", name);
        for i in 0..100 {
            runtime.accelerometer().put(motion(id, i, &mut rng))?;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        if let Some(best) = runtime.classifier().best_prediction() {
            println!(
                "  -> {} ({:.0}%{})\n",
                best.label.as_deref().unwrap_or("?"),
                best.confidence * 100.0,
                if best.meets_threshold { "" } else { ", below threshold" }
            );
        }
    }

    let stats = runtime.engine().stats();
    println!(
        "Ticks: {}  predictions: {}  skipped: {}  failures: {}",
        stats.ticks, stats.predictions, stats.skipped, stats.failures
    );

    runtime.shutdown();
    Ok(())
}
