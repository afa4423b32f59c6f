//! Orchestration entry point

use crate::dump::DumpStore;
use crate::error::{FreezerError, Result};
use crate::waiter::{ActionWaiter, PollConfig};
use freezer_cloud::{ControlPlane, Server};
use std::sync::Arc;
use tokio::sync::watch;

/// Drives freeze, unfreeze and dump runs against one control plane and one
/// dump store
pub struct Freezer {
    pub(crate) cloud: Arc<dyn ControlPlane>,
    pub(crate) store: DumpStore,
    pub(crate) waiter: ActionWaiter,
}

impl Freezer {
    pub fn new(cloud: Arc<dyn ControlPlane>, store: DumpStore) -> Self {
        let waiter = ActionWaiter::new(cloud.clone(), PollConfig::default());
        Self {
            cloud,
            store,
            waiter,
        }
    }

    pub fn with_poll_config(mut self, config: PollConfig) -> Self {
        self.waiter = self.waiter.with_config(config);
        self
    }

    /// Abort pending action waits once `cancel` turns `true`
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.waiter = self.waiter.with_cancellation(cancel);
        self
    }

    pub fn store(&self) -> &DumpStore {
        &self.store
    }

    /// Dump ids recorded for a server, oldest first
    pub async fn list_dumps(&self, server_name: &str) -> Result<Vec<String>> {
        self.store.list(server_name).await
    }

    pub(crate) async fn lookup_server(&self, server_name: &str) -> Result<Server> {
        tracing::info!("Looking up server {}", server_name);
        self.cloud
            .get_server_by_name(server_name)
            .await?
            .ok_or_else(|| FreezerError::ServerNotFound(server_name.to_string()))
    }
}
