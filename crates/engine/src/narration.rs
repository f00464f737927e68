//! Delayed progress notes shown while the backend call is in flight.
//!
//! A dispatch can take anywhere from one second to a minute. The narrator
//! publishes a few time-delayed notes so the front end has something to show,
//! but only while the run is still dispatching: once the stage moves on, or
//! the guard is dropped, nothing further is emitted.

use std::time::Duration;

use promptgauge_core::status::{Stage, StatusBus, StatusUpdate};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

/// One note, published `delay` after dispatch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedNote {
    pub delay: Duration,
    pub headline: String,
    pub detail: String,
}

impl DelayedNote {
    pub fn new(delay: Duration, headline: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            delay,
            headline: headline.into(),
            detail: detail.into(),
        }
    }
}

/// The notes to publish during one dispatch, sorted by delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationSchedule {
    notes: Vec<DelayedNote>,
}

impl NarrationSchedule {
    pub fn new(mut notes: Vec<DelayedNote>) -> Self {
        notes.sort_by_key(|n| n.delay);
        Self { notes }
    }

    /// A schedule that never publishes anything.
    pub fn silent() -> Self {
        Self { notes: Vec::new() }
    }

    pub fn notes(&self) -> &[DelayedNote] {
        &self.notes
    }

    pub fn is_silent(&self) -> bool {
        self.notes.is_empty()
    }
}

impl Default for NarrationSchedule {
    fn default() -> Self {
        Self::new(vec![
            DelayedNote::new(
                Duration::from_secs(1),
                "Assessing your prompt...",
                "Evaluating clarity, completeness, and cost efficiency",
            ),
            DelayedNote::new(
                Duration::from_secs(4),
                "Calculating costs...",
                "Estimating token costs across frontier models",
            ),
            DelayedNote::new(
                Duration::from_secs(10),
                "Still working...",
                "Larger models and local daemons can take up to a minute to respond",
            ),
        ])
    }
}

/// Handle to a running narrator. Dropping it cancels any pending note.
pub struct NarrationGuard {
    handle: Option<JoinHandle<()>>,
}

impl NarrationGuard {
    fn inert() -> Self {
        Self { handle: None }
    }

    /// Stop publishing. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for NarrationGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start publishing `schedule` on `bus` for as long as `stage` reads
/// [`Stage::Dispatching`].
pub fn spawn(
    schedule: &NarrationSchedule,
    bus: StatusBus,
    stage: watch::Receiver<Stage>,
) -> NarrationGuard {
    if schedule.is_silent() {
        return NarrationGuard::inert();
    }

    let notes = schedule.notes.clone();
    let handle = tokio::spawn(async move {
        let start = tokio::time::Instant::now();
        for note in notes {
            tokio::time::sleep_until(start + note.delay).await;
            if *stage.borrow() != Stage::Dispatching {
                trace!("Dispatch finished, dropping pending notes");
                return;
            }
            bus.publish(StatusUpdate::new(Stage::Dispatching, note.headline, note.detail));
        }
    });

    NarrationGuard {
        handle: Some(handle),
    }
}
