//! Cosmetic progress narration for the long-running synthesis call.
//!
//! The narrator knows nothing about real backend progress. It walks a fixed
//! script on a timer, holds the last line once the script runs out, and stops
//! the moment it is cancelled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Status lines shown while the try-on image is generated.
pub const NARRATION: [&str; 5] = [
    "Analyzing clothing item…",
    "Detecting body pose…",
    "Running AI model…",
    "Generating result…",
    "Finalizing…",
];

pub const DEFAULT_NARRATION_INTERVAL: Duration = Duration::from_secs(2);

/// Receives narrator status lines.
pub trait StatusReporter: Send + Sync {
    fn report(&self, label: &str);
}

/// No-op reporter for unit tests.
pub struct NoopStatus;

impl StatusReporter for NoopStatus {
    fn report(&self, _label: &str) {}
}

/// The narration script as a lazy, finite iterator.
#[derive(Debug, Clone, Default)]
pub struct NarrationScript {
    next: usize,
}

impl NarrationScript {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for NarrationScript {
    type Item = &'static str;

    fn next(&mut self) -> Option<Self::Item> {
        let label = NARRATION.get(self.next).copied()?;
        self.next += 1;
        Some(label)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = NARRATION.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NarrationScript {}

#[derive(Default)]
struct NarratorState {
    /// Bumped by every start and cancel; a ticker only emits for its own run.
    run: u64,
    label: Option<&'static str>,
    ticker: Option<JoinHandle<()>>,
}

/// Restartable, cancelable status ticker.
#[derive(Clone)]
pub struct ProgressNarrator {
    state: Arc<Mutex<NarratorState>>,
    interval: Duration,
    reporter: Arc<dyn StatusReporter>,
}

impl ProgressNarrator {
    pub fn new(interval: Duration, reporter: Arc<dyn StatusReporter>) -> Self {
        Self {
            state: Arc::new(Mutex::new(NarratorState::default())),
            interval: interval.max(Duration::from_millis(1)),
            reporter,
        }
    }

    fn lock(&self) -> MutexGuard<'_, NarratorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts (or restarts) narration from the first line.
    ///
    /// The first line is emitted before this returns; the rest follow one per
    /// interval. Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut state = self.lock();
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        state.run += 1;
        let run = state.run;

        let mut script = NarrationScript::new();
        if let Some(first) = script.next() {
            state.label = Some(first);
            self.reporter.report(first);
        }

        let shared = Arc::clone(&self.state);
        let reporter = Arc::clone(&self.reporter);
        let period = self.interval;
        state.ticker = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            for label in script {
                ticker.tick().await;
                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if state.run != run {
                    return;
                }
                state.label = Some(label);
                reporter.report(label);
            }
            log::trace!("Narration run {} exhausted", run);
        }));
        log::debug!("Narration run {} started", run);
    }

    /// Stops narration. No status line is emitted after this returns.
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.run += 1;
        state.label = None;
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
            log::debug!("Narration cancelled");
        }
    }

    /// Line currently on display, if narration is active.
    pub fn current_label(&self) -> Option<&'static str> {
        self.lock().label
    }

    /// True between `start` and `cancel`, including after the script ran out.
    pub fn is_active(&self) -> bool {
        self.lock().ticker.is_some()
    }
}

impl Drop for NarratorState {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
