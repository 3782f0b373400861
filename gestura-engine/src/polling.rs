//! Timer-driven prediction loop
//!
//! ## Task Layout
//!
//! ```text
//! Store<PredictionSettings> ──subscribe──► watch::Sender
//!                                               │
//!                      ┌────────────────────────▼─────────────────┐
//!  CancellationToken ─►│ select! { cancelled | settings | tick }  │ tokio task
//!                      └────────────────────────┬─────────────────┘
//!                                               ▼
//!            gate ─► search_window ─► SeriesInput ─► Classifier::predict_live
//!                                                              │
//!                                  running? ─► publish + PredictionOutcome
//! ```
//!
//! Ticks run to completion inside the task, so predictions never overlap;
//! a slow prediction delays the next tick instead of queueing more.
//!
//! Live input is assembled with the layout the model was trained on, so a
//! settings change that marks the model untrained does not interrupt
//! predictions. A panic inside the model is caught and recorded as a failed
//! prediction; the task keeps ticking.
//!
//! ## Teardown
//!
//! `shutdown()` cancels the task and disposes the settings subscription.
//! It is idempotent, and dropping the engine calls it.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use gestura_core::{
    CombinedLiveData, CombinedSample, CoreError, LiveData, RingBuffer, Store, Subscribers,
    Subscription, TimestampedSample,
};
use gestura_ml::{Classifier, Confidences, MlError, SeriesInput};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::settings::{PollingConfig, PredictionSettings};
use crate::{EngineError, EngineResult};

/// Result of a successful window search
#[derive(Debug, Clone)]
pub struct WindowFetch<T> {
    pub samples: Vec<TimestampedSample<T>>,
    /// Every window size tried, the successful one last
    pub attempts: Vec<usize>,
}

/// Find the largest usable window, shrinking on underrun
///
/// Each failed attempt shrinks the request by `step_size`, but never below
/// the number of samples the buffer reported available and never below
/// `min_window`. A failure at `min_window` ends the search.
pub fn search_window<T: Clone>(
    buffer: &RingBuffer<T>,
    config: &PollingConfig,
) -> EngineResult<WindowFetch<T>> {
    let step = config.step_size.max(1);
    let mut size = config.sample_size;
    let mut attempts = Vec::new();

    loop {
        attempts.push(size);
        match buffer.window_by_duration(config.sample_duration_ms, size) {
            Ok(samples) => return Ok(WindowFetch { samples, attempts }),
            Err(CoreError::InsufficientData { available, .. }) => {
                if size <= config.min_window {
                    return Err(EngineError::WindowUnavailable { attempts });
                }
                let next = size.saturating_sub(step).max(available).max(config.min_window);
                log::debug!("Window of {} unavailable ({} fresh samples), trying {}", size, available, next);
                size = next;
            }
            Err(other) => return Err(other.into()),
        }
    }
}

/// What a prediction tick produced
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Predicted(Confidences),
    Failed(MlError),
}

/// Tick counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Timer ticks handled
    pub ticks: u64,
    /// Ticks that did not reach prediction (gated or no window)
    pub skipped: u64,
    /// Predictions published
    pub predictions: u64,
    /// Predictions that failed
    pub failures: u64,
}

struct EngineShared {
    classifier: Arc<Classifier>,
    combined: Arc<CombinedLiveData>,
    config: PollingConfig,
    running: Store<bool>,
    is_predicting: Store<bool>,
    outcomes: Subscribers<PredictionOutcome>,
    last_outcome: Mutex<Option<PredictionOutcome>>,
    stats: Mutex<EngineStats>,
}

impl EngineShared {
    fn eligible(&self) -> bool {
        let model = self.classifier.model();
        self.running.get() && model.has_model() && !model.is_training()
    }

    async fn tick(&self) {
        self.stats.lock().ticks += 1;

        if !self.eligible() {
            self.stats.lock().skipped += 1;
            return;
        }

        // The buffer guard must not live across the prediction await
        let window = {
            let buffer = self.combined.buffer();
            search_window(&*buffer, &self.config)
        };
        let fetch: WindowFetch<CombinedSample> = match window {
            Ok(fetch) => fetch,
            Err(err) => {
                log::warn!("Skipping prediction tick: {}", err);
                self.stats.lock().skipped += 1;
                return;
            }
        };

        let input = SeriesInput::from_window(&fetch.samples);
        let predicting = PredictingFlag::raise(&self.is_predicting);
        let result = AssertUnwindSafe(self.classifier.predict_live(&input))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                log::error!("Model panicked during prediction");
                Err(MlError::InvalidPrediction { reason: "model panicked during prediction" })
            });
        drop(predicting);

        if !self.running.get() {
            log::debug!("Engine stopped during prediction, result discarded");
            return;
        }

        let outcome = match result {
            Ok(confidences) => {
                self.classifier.publish(&confidences);
                self.stats.lock().predictions += 1;
                PredictionOutcome::Predicted(confidences)
            }
            Err(err) => {
                log::warn!("Prediction failed: {}", err);
                self.stats.lock().failures += 1;
                PredictionOutcome::Failed(err)
            }
        };
        *self.last_outcome.lock() = Some(outcome.clone());
        self.outcomes.notify(&outcome);
    }
}

/// Holds `is_predicting` up until dropped, however the prediction ends
struct PredictingFlag<'a>(&'a Store<bool>);

impl<'a> PredictingFlag<'a> {
    fn raise(flag: &'a Store<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for PredictingFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

fn build_timer(settings: &PredictionSettings) -> Option<Interval> {
    settings.interval().map(|period| {
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    })
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn run_loop(
    shared: Arc<EngineShared>,
    mut settings: watch::Receiver<PredictionSettings>,
    cancel: CancellationToken,
) {
    let mut timer = build_timer(&settings.borrow_and_update());
    let mut settings_open = true;
    log::info!("Polling engine started");

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                log::info!("Polling engine stopped");
                break;
            }

            changed = settings.changed(), if settings_open => {
                if changed.is_err() {
                    settings_open = false;
                    continue;
                }
                let current = *settings.borrow_and_update();
                timer = build_timer(&current);
                match current.interval() {
                    Some(period) => log::debug!("Prediction interval set to {:?}", period),
                    None => log::debug!("Automatic classification disabled"),
                }
            }

            _ = next_tick(&mut timer) => {
                shared.tick().await;
            }
        }
    }
}

/// Periodic classifier driver
pub struct PollingEngine {
    shared: Arc<EngineShared>,
    cancel: CancellationToken,
    settings_subscription: Mutex<Option<Subscription>>,
}

impl PollingEngine {
    /// Start the timer task on the current tokio runtime
    ///
    /// The engine starts in the running state.
    pub fn spawn(
        classifier: Arc<Classifier>,
        combined: Arc<CombinedLiveData>,
        settings: &Store<PredictionSettings>,
        config: PollingConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        let handle = tokio::runtime::Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let (sender, receiver) = watch::channel(settings.get());
        let subscription = settings.subscribe(move |value| {
            sender.send_replace(*value);
        });

        let shared = Arc::new(EngineShared {
            classifier,
            combined,
            config,
            running: Store::new(true),
            is_predicting: Store::new(false),
            outcomes: Subscribers::new(),
            last_outcome: Mutex::new(None),
            stats: Mutex::new(EngineStats::default()),
        });
        let cancel = CancellationToken::new();
        handle.spawn(run_loop(shared.clone(), receiver, cancel.clone()));

        Ok(Self {
            shared,
            cancel,
            settings_subscription: Mutex::new(Some(subscription)),
        })
    }

    pub fn start(&self) {
        if self.shared.running.set(true) {
            log::info!("Prediction resumed");
        }
    }

    /// Pause predictions; the timer keeps running
    pub fn stop(&self) {
        if self.shared.running.set(false) {
            log::info!("Prediction paused");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.get()
    }

    pub fn is_predicting(&self) -> bool {
        self.shared.is_predicting.get()
    }

    pub fn config(&self) -> &PollingConfig {
        &self.shared.config
    }

    pub fn stats(&self) -> EngineStats {
        *self.shared.stats.lock()
    }

    pub fn last_outcome(&self) -> Option<PredictionOutcome> {
        self.shared.last_outcome.lock().clone()
    }

    pub fn subscribe_running<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.shared.running.subscribe(callback)
    }

    pub fn subscribe_predicting<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.shared.is_predicting.subscribe(callback)
    }

    /// Observe every prediction outcome, including repeats
    pub fn subscribe_outcomes<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PredictionOutcome) + Send + Sync + 'static,
    {
        self.shared.outcomes.subscribe(callback)
    }

    /// Run one tick immediately, outside the timer
    pub async fn poll_once(&self) {
        self.shared.tick().await;
    }

    /// Stop the timer task and release the settings subscription. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(mut subscription) = self.settings_subscription.lock().take() {
            subscription.unsubscribe();
            log::debug!("Polling engine released settings subscription");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PollingEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
