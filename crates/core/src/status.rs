//! Assessment stages and progress notifications.
//!
//! The orchestrator publishes a [`StatusUpdate`] whenever it moves to a new
//! stage; front ends subscribe and show the latest one. Each update
//! supersedes the previous.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// States of one assessment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Validating,
    Preflighting,
    Compiling,
    Dispatching,
    Fallback,
    Normalizing,
    Done,
    Failed,
}

impl Stage {
    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Fallback)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Preflighting => "preflighting",
            Self::Compiling => "compiling",
            Self::Dispatching => "dispatching",
            Self::Fallback => "fallback",
            Self::Normalizing => "normalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A progress message for the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub stage: Stage,
    pub headline: String,
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn new(stage: Stage, headline: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            stage,
            headline: headline.into(),
            detail: detail.into(),
            at: Utc::now(),
        }
    }
}

/// A broadcast-based bus for status updates.
///
/// Uses `tokio::sync::broadcast` so several front ends can follow one run.
#[derive(Clone)]
pub struct StatusBus {
    sender: broadcast::Sender<Arc<StatusUpdate>>,
}

impl StatusBus {
    /// Create a new bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an update to all subscribers.
    pub fn publish(&self, update: StatusUpdate) {
        // No subscribers is fine.
        let _ = self.sender.send(Arc::new(update));
    }

    /// Subscribe to future updates.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<StatusUpdate>> {
        self.sender.subscribe()
    }
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new(64)
    }
}
