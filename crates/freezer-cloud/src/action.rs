//! Asynchronous control plane actions

use serde::{Deserialize, Serialize};

/// A long-running operation tracked by the control plane
///
/// Actions are owned by the remote side; callers only observe them by
/// polling [`crate::ControlPlane::get_action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: i64,

    /// Command that started the action (e.g. "shutdown_server")
    #[serde(default)]
    pub command: String,

    /// Current status
    pub status: ActionStatus,

    /// Progress in percent (0-100)
    #[serde(default)]
    pub progress: u8,

    /// Present only when `status` is [`ActionStatus::Error`]
    #[serde(default)]
    pub error: Option<ActionError>,
}

impl Action {
    pub fn new(id: i64, command: impl Into<String>, status: ActionStatus) -> Self {
        let progress = if status == ActionStatus::Success { 100 } else { 0 };
        Self {
            id,
            command: command.into(),
            status,
            progress,
            error: None,
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.status = ActionStatus::Error;
        self.error = Some(ActionError {
            code: code.into(),
            message: message.into(),
        });
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }

    /// Error message reported by the control plane, empty if none
    pub fn error_message(&self) -> &str {
        self.error.as_ref().map(|e| e.message.as_str()).unwrap_or("")
    }
}

/// Status of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Running,
    Success,
    Error,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Running => write!(f, "running"),
            ActionStatus::Success => write!(f, "success"),
            ActionStatus::Error => write!(f, "error"),
        }
    }
}

/// Error attached to a failed action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    pub code: String,
    pub message: String,
}
