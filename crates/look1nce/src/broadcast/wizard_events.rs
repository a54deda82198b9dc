//! Wizard event broadcaster for UI observers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::narrator::StatusReporter;
use crate::wizard::WizardSnapshot;

/// Event published to wizard observers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WizardEvent {
    /// The wizard moved to a new state or its data changed.
    StateChanged(WizardSnapshot),
    /// The progress narrator advanced.
    #[serde(rename_all = "camelCase")]
    Status {
        label: String,
        timestamp: DateTime<Utc>,
    },
}

impl WizardEvent {
    pub fn status(label: &str) -> Self {
        WizardEvent::Status {
            label: label.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcasts wizard events to any number of subscribers.
#[derive(Clone)]
pub struct WizardBroadcaster {
    sender: Arc<broadcast::Sender<WizardEvent>>,
}

impl WizardBroadcaster {
    /// Creates a new broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: WizardEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for WizardBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}

impl StatusReporter for WizardBroadcaster {
    fn report(&self, label: &str) {
        self.send(WizardEvent::status(label));
    }
}
