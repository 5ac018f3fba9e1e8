//! User interaction seams: blocking alerts and yes/no confirmation.
//!
//! The session never writes to a terminal directly. Everything a user must
//! see about a failure (or a completed destructive action) goes through a
//! [`Notifier`], and destructive actions ask a [`Confirm`] first.

use parking_lot::Mutex;
use serde::Serialize;

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notice {
    UploadFailed { file: String, detail: String },
    QueryFailed { detail: String },
    ClearFailed { detail: String },
    Cleared,
    /// Only emitted under [`StatsErrorPolicy::Surface`](crate::session::StatsErrorPolicy).
    StatsFailed { detail: String },
}

impl Notice {
    /// The alert text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Notice::UploadFailed { file, detail } => {
                format!("Error uploading {}: {}", file, detail)
            }
            Notice::QueryFailed { detail } | Notice::ClearFailed { detail } => {
                format!("Error: {}", detail)
            }
            Notice::Cleared => "Database cleared successfully".to_string(),
            Notice::StatsFailed { detail } => format!("Error fetching stats: {}", detail),
        }
    }
}

/// Delivers notices to the user. Implementations may block until dismissed.
pub trait Notifier: Send + Sync {
    fn alert(&self, notice: Notice);
}

/// Asks the user a blocking yes/no question.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Collects notices in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.lock().iter().map(Notice::message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
