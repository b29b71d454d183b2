use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use chezflora_lifecycle::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Outcome {
    Applied { status: String },
    Rejected { message: String },
}

/// One user-facing notification about a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub record_id: RecordId,
    pub outcome: Outcome,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn applied(record_id: RecordId, status: &str) -> Self {
        Self {
            record_id,
            outcome: Outcome::Applied {
                status: status.to_string(),
            },
            at: Utc::now(),
        }
    }

    pub fn rejected(record_id: RecordId, message: String) -> Self {
        Self {
            record_id,
            outcome: Outcome::Rejected { message },
            at: Utc::now(),
        }
    }
}

/// Fire-and-forget notification outlet. The service never depends on the
/// sink's outcome.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that forwards notifications to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        match &notification.outcome {
            Outcome::Applied { status } => {
                info!(record_id = %notification.record_id, %status, "transition applied");
            }
            Outcome::Rejected { message } => {
                warn!(record_id = %notification.record_id, %message, "transition rejected");
            }
        }
    }
}

/// In-memory sink retaining the most recent notifications.
///
/// The capacity is an explicit bound; the oldest entries are evicted once it
/// is reached.
#[derive(Debug)]
pub struct BoundedSink {
    capacity: usize,
    entries: Mutex<VecDeque<Notification>>,
}

impl BoundedSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Retained notifications, oldest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl NotificationSink for BoundedSink {
    fn notify(&self, notification: Notification) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if self.capacity == 0 {
            return;
        }
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(notification);
    }
}
