//! Cross-component notifications.

use tokio::sync::broadcast;

use crate::domain::{CreatedTask, DraftId};

const CHANNEL_CAPACITY: usize = 64;

/// Something other components may react to.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The task assistant created tasks in the backend.
    TasksCreated { tasks: Vec<CreatedTask> },
    DraftGenerated { id: DraftId },
    DraftSent { id: DraftId },
}

/// Fan-out channel for [`AppEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event. Having no subscribers is not an error.
    pub fn publish(&self, event: AppEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("No subscribers for app event");
        }
    }
}
