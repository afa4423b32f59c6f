//! Freeze: snapshot a server, release its addresses and delete it

use crate::dump::new_dump_id;
use crate::error::Result;
use crate::freezer::Freezer;
use freezer_cloud::CloudError;

impl Freezer {
    /// Freeze the server named `server_name`, returning the id of its dump
    ///
    /// Steps run strictly in order and nothing is rolled back on failure.
    /// The server is deleted last, once the dump is on disk and every
    /// address has been released.
    pub async fn freeze(&self, server_name: &str) -> Result<String> {
        let dump_id = new_dump_id();
        let server = self.lookup_server(server_name).await?;

        tracing::info!("Shutting down server {} ({})", server.name, server.id);
        let action = self.cloud.shutdown_server(server.id).await?;
        self.waiter.wait(&action).await?;

        let dump = self.capture(&dump_id, &server).await?;

        for recorded in &dump.floating_ips {
            let floating_ip = self
                .cloud
                .get_floating_ip(recorded.id)
                .await?
                .ok_or_else(|| CloudError::ResourceNotFound(format!("floating ip {}", recorded.id)))?;

            tracing::info!("Unassigning floating IP {} ({})", floating_ip.ip, floating_ip.id);
            let action = self.cloud.unassign_floating_ip(floating_ip.id).await?;
            self.waiter.wait(&action).await?;
        }

        if let Some(id) = server.public_net.ipv4_id() {
            tracing::info!("Unassigning primary IPv4 {}", id);
            let action = self.cloud.unassign_primary_ip(id).await?;
            self.waiter.wait(&action).await?;
        }

        if let Some(id) = server.public_net.ipv6_id() {
            tracing::info!("Unassigning primary IPv6 {}", id);
            let action = self.cloud.unassign_primary_ip(id).await?;
            self.waiter.wait(&action).await?;
        }

        tracing::info!("Deleting server {} ({})", server.name, server.id);
        let action = self.cloud.delete_server(server.id).await?;
        self.waiter.wait(&action).await?;

        tracing::info!("Server {} frozen as dump {}", server.name, dump_id);
        Ok(dump_id)
    }
}
