//! Capturing a live server into a dump

use crate::dump::{ServerDump, new_dump_id};
use crate::error::Result;
use crate::freezer::Freezer;
use chrono::Local;
use freezer_cloud::{CreateImageOpts, Server};

impl Freezer {
    /// Snapshot `server` and persist its configuration as dump `dump_id`
    ///
    /// The snapshot image is left in place if a later step fails.
    pub async fn capture(&self, dump_id: &str, server: &Server) -> Result<ServerDump> {
        tracing::info!("Collecting floating IPs of server {}", server.name);
        let floating_ips = self
            .cloud
            .list_floating_ips()
            .await?
            .into_iter()
            .filter(|fip| fip.is_assigned_to(server.id))
            .collect::<Vec<_>>();

        // every key of the project, whether or not the server uses it
        tracing::info!("Collecting SSH keys");
        let ssh_keys = self.cloud.list_ssh_keys().await?;

        let description = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        tracing::info!("Creating snapshot of server {}: {}", server.name, description);
        let created = self
            .cloud
            .create_image(server.id, &CreateImageOpts::snapshot(description))
            .await?;
        self.waiter.wait(&created.action).await?;

        let dump = ServerDump {
            server: server.clone(),
            floating_ips,
            ssh_keys,
            snapshot: created.image,
        };
        let dir = self.store.save(dump_id, &dump).await?;
        tracing::info!("Server dump written to {}", dir.display());

        Ok(dump)
    }

    /// Dump a running server without shutting it down
    pub async fn create_server_dump(&self, server_name: &str) -> Result<String> {
        let server = self.lookup_server(server_name).await?;
        let dump_id = new_dump_id();
        self.capture(&dump_id, &server).await?;
        Ok(dump_id)
    }
}
