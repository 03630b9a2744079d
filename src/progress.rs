//! Shared batch progress and the simulated progress shown for videos.
//!
//! The engine has no progress channel, so every percentage published here is
//! cosmetic. [`ProgressSimulator`] owns a ticking task that nudges the value
//! toward a ceiling while a video transcode is in flight; dropping the
//! simulator stops it, on every exit path of the request it belongs to.

use crate::config::ProgressConfig;
use crate::events::{EventBus, EventPayload};
use crate::queue::ProgressState;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Status line while an item is being worked on.
pub fn processing_message(position: usize, total: usize, name: &str, percentage: u32) -> String {
    format!("Processing {}/{}: {}... ({}%)", position, total, name, percentage)
}

/// Status line once an item has converted.
pub fn converted_message(position: usize, total: usize, name: &str) -> String {
    format!("✓ Converted {}/{}: {}", position, total, name)
}

/// Handle to the single shared progress value.
#[derive(Clone)]
pub struct ProgressReporter {
    state: Arc<RwLock<ProgressState>>,
    events: Arc<EventBus>,
}

impl ProgressReporter {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ProgressState::idle())),
            events,
        }
    }

    pub fn set(&self, percentage: u32, message: impl Into<String>) {
        let mut state = self.state.write();
        self.write(&mut state, percentage, message.into());
    }

    /// Back to the idle message at 0%.
    pub fn reset(&self) {
        let idle = ProgressState::idle();
        self.set(idle.percentage, idle.message);
    }

    pub fn snapshot(&self) -> ProgressState {
        self.state.read().clone()
    }

    /// Write unless `stopped` is set; the check happens under the lock so a
    /// stopped simulator can never overwrite a later value.
    fn set_unless_stopped(&self, stopped: &AtomicBool, percentage: u32, message: String) {
        let mut state = self.state.write();
        if stopped.load(Ordering::SeqCst) {
            return;
        }
        self.write(&mut state, percentage, message);
    }

    fn write(&self, state: &mut ProgressState, percentage: u32, message: String) {
        state.percentage = percentage.min(100);
        state.message = message;
        self.events.publish(EventPayload::ProgressChanged {
            percentage: state.percentage,
            message: state.message.clone(),
        });
    }
}

/// Fake progress for one in-flight request. Stops when dropped.
pub struct ProgressSimulator {
    stopped: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ProgressSimulator {
    /// Start ticking for item `position` of `total`.
    ///
    /// The first tick lands one interval after start; each adds a random step
    /// in `[0, max_step)` and the value is capped at the configured ceiling.
    pub fn start(
        reporter: ProgressReporter,
        config: &ProgressConfig,
        position: usize,
        total: usize,
        name: &str,
    ) -> Self {
        let stopped = Arc::new(AtomicBool::new(false));
        let period = config.simulator_interval();
        let ceiling = f64::from(config.simulator_ceiling.min(100));
        let max_step = config.simulator_max_step;
        let name = name.to_string();
        let flag = stopped.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            let mut fake = 0.0_f64;
            loop {
                ticker.tick().await;
                fake = (fake + rand::random::<f64>() * max_step).min(ceiling);
                let percentage = fake.round() as u32;
                reporter.set_unless_stopped(
                    &flag,
                    percentage,
                    processing_message(position, total, &name, percentage),
                );
            }
        });

        Self { stopped, handle }
    }

    /// Stop the simulator now rather than at end of scope.
    pub fn stop(self) {}
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.handle.abort();
    }
}
