//! Waiting for control plane actions
//!
//! Every mutating control plane call starts an action that completes in the
//! background. [`ActionWaiter`] polls such an action until it succeeds,
//! fails, runs past its deadline or the run is cancelled.

use crate::error::{FreezerError, Result};
use freezer_cloud::{Action, ActionStatus, ControlPlane};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, interval_at, sleep};

/// Error message fragment the control plane reports for transient failures
pub const TRANSIENT_ERROR_MARKER: &str = "Unknown error";

/// Polling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two polls
    pub interval: Duration,

    /// Upper bound for a single wait
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            deadline: Duration::from_secs(10 * 60),
        }
    }
}

/// Polls actions until they reach a terminal state
#[derive(Clone)]
pub struct ActionWaiter {
    cloud: Arc<dyn ControlPlane>,
    config: PollConfig,
    cancel: watch::Receiver<bool>,
}

impl ActionWaiter {
    pub fn new(cloud: Arc<dyn ControlPlane>, config: PollConfig) -> Self {
        let (_, cancel) = watch::channel(false);
        Self {
            cloud,
            config,
            cancel,
        }
    }

    /// Abort waits once `cancel` turns `true`
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Wait until `action` succeeds
    ///
    /// Errors reported with [`TRANSIENT_ERROR_MARKER`] keep the poll going.
    /// A failing poll request is returned as is, without retry.
    pub async fn wait(&self, action: &Action) -> Result<()> {
        if action.is_success() {
            tracing::info!(action_id = action.id, "action progress 100/100");
            return Ok(());
        }

        let mut cancel = self.cancel.clone();
        let deadline = sleep(self.config.deadline);
        tokio::pin!(deadline);
        let mut ticker = interval_at(Instant::now() + self.config.interval, self.config.interval);
        let mut status = action.status;
        let mut progress = action.progress;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let current = self.cloud.get_action(action.id).await?;
                    status = current.status;
                    progress = current.progress;

                    match current.status {
                        ActionStatus::Success => {
                            tracing::info!(action_id = action.id, "action progress 100/100");
                            return Ok(());
                        }
                        ActionStatus::Error if is_transient(current.error_message()) => {
                            tracing::warn!(
                                action_id = action.id,
                                "action reported transient error, still waiting: {}",
                                current.error_message()
                            );
                        }
                        ActionStatus::Error => {
                            return Err(FreezerError::ActionFailed {
                                action_id: action.id,
                                status: current.status,
                                message: current.error_message().to_string(),
                            });
                        }
                        ActionStatus::Running => {
                            tracing::info!(action_id = action.id, "action progress {}/100", current.progress);
                        }
                    }
                }
                _ = &mut deadline => {
                    return Err(FreezerError::DeadlineExceeded {
                        action_id: action.id,
                        status,
                        progress,
                    });
                }
                _ = cancelled(&mut cancel) => {
                    return Err(FreezerError::Cancelled {
                        action_id: action.id,
                        status,
                        progress,
                    });
                }
            }
        }
    }
}

fn is_transient(message: &str) -> bool {
    message.contains(TRANSIENT_ERROR_MARKER)
}

/// Resolves once the cancellation flag is set; never if the sender is gone
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
