//! Unfreeze: recreate a server from a dump and reattach its addresses

use crate::cloud_init::floating_ip_user_data;
use crate::dump::ServerDump;
use crate::error::{FreezerError, Result};
use crate::freezer::Freezer;
use freezer_cloud::{
    AttachToNetworkOpts, CloudError, CreatePublicNet, CreateServerOpts, FloatingIp,
};
use std::net::Ipv4Addr;

impl Freezer {
    /// Recreate the server named `server_name` from a dump
    ///
    /// Without `dump_id`, or with an empty one, the newest dump is used. A
    /// server created before a later step fails is left in place.
    pub async fn unfreeze(&self, server_name: &str, dump_id: Option<&str>) -> Result<()> {
        let dump_id = match dump_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self.store.latest(server_name).await?,
        };
        tracing::info!("Restoring server {} from dump {}", server_name, dump_id);
        let dump = self.store.load(server_name, &dump_id).await?;
        if dump.server.name.is_empty() {
            return Err(FreezerError::InvalidDump(format!(
                "dump {} has no server name",
                dump_id
            )));
        }

        let mut floating_ips = Vec::with_capacity(dump.floating_ips.len());
        for recorded in &dump.floating_ips {
            let floating_ip = self
                .cloud
                .get_floating_ip(recorded.id)
                .await?
                .ok_or_else(|| CloudError::ResourceNotFound(format!("floating ip {}", recorded.id)))?;
            floating_ips.push(floating_ip);
        }

        let opts = create_server_opts(&dump, &floating_ips);
        tracing::info!("Creating server {} from snapshot {}", opts.name, opts.image);
        let created = self.cloud.create_server(&opts).await?;
        self.waiter.wait(&created.action).await?;
        let server_id = created.server.id;

        for floating_ip in &floating_ips {
            tracing::info!("Assigning floating IP {} ({})", floating_ip.ip, floating_ip.id);
            let action = self.cloud.assign_floating_ip(floating_ip.id, server_id).await?;
            self.waiter.wait(&action).await?;
        }

        for private_net in &dump.server.private_net {
            let ip = match private_net.ip.parse::<Ipv4Addr>() {
                Ok(ip) => ip,
                Err(e) => {
                    tracing::warn!(
                        "Skipping network {}: invalid private IP {:?}: {}",
                        private_net.network,
                        private_net.ip,
                        e
                    );
                    continue;
                }
            };

            tracing::info!("Attaching server to network {} with IP {}", private_net.network, ip);
            let opts = AttachToNetworkOpts {
                network: private_net.network,
                ip,
            };
            let action = self.cloud.attach_server_to_network(server_id, &opts).await?;
            self.waiter.wait(&action).await?;
        }

        tracing::info!("Server {} restored ({})", server_name, server_id);
        Ok(())
    }
}

/// Creation request for the server recorded in `dump`
pub fn create_server_opts(dump: &ServerDump, floating_ips: &[FloatingIp]) -> CreateServerOpts {
    let server = &dump.server;
    let ipv4 = server.public_net.ipv4_id();
    let ipv6 = server.public_net.ipv6_id();
    let ips: Vec<&str> = floating_ips.iter().map(|f| f.ip.as_str()).collect();

    CreateServerOpts {
        name: server.name.clone(),
        server_type: server.server_type.id,
        image: dump.snapshot.id,
        datacenter: Some(server.datacenter.id).filter(|id| *id != 0),
        ssh_keys: dump.ssh_keys.iter().map(|k| k.id).collect(),
        user_data: floating_ip_user_data(&ips),
        labels: server.labels.clone(),
        volumes: server.volumes.clone(),
        firewalls: server.public_net.firewalls.iter().map(|f| f.id).collect(),
        placement_group: server.placement_group.as_ref().map(|p| p.id),
        public_net: CreatePublicNet {
            enable_ipv4: ipv4.is_some(),
            enable_ipv6: ipv6.is_some(),
            ipv4,
            ipv6,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::DumpStore;
    use crate::testing::{floating_ip, sample_dump};
    use freezer_cloud::fake::{Call, FakeControlPlane};
    use freezer_cloud::PrimaryIpAssignment;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    fn cloud() -> FakeControlPlane {
        FakeControlPlane::new()
            .with_floating_ip(floating_ip(1, "10.0.0.5", None))
            .with_floating_ip(floating_ip(2, "10.0.0.6", None))
    }

    async fn store_with(dumps: &[(&str, ServerDump)]) -> (TempDir, DumpStore) {
        let temp_dir = tempdir().unwrap();
        let store = DumpStore::new(temp_dir.path(), "acme");
        for (id, dump) in dumps {
            store.save(id, dump).await.unwrap();
        }
        (temp_dir, store)
    }

    /// Unfreeze restores the latest dump in order
    #[tokio::test]
    async fn test_unfreeze_latest_dump() {
        let mut older = sample_dump();
        older.snapshot.id = 444;
        let (_temp_dir, store) = store_with(&[("100", older), ("200", sample_dump())]).await;
        let cloud = Arc::new(cloud());
        let freezer = Freezer::new(cloud.clone(), store);

        freezer.unfreeze("web", None).await.unwrap();

        // server 1001, create action 1002
        let mutations = cloud.mutations();
        assert_eq!(
            mutations,
            vec![
                Call::GetFloatingIp(1),
                Call::GetFloatingIp(2),
                Call::CreateServer("web".to_string()),
                Call::AssignFloatingIp {
                    floating_ip: 1,
                    server: 1001
                },
                Call::AssignFloatingIp {
                    floating_ip: 2,
                    server: 1001
                },
                Call::AttachToNetwork {
                    server: 1001,
                    network: 5,
                    ip: Ipv4Addr::new(10, 0, 0, 2)
                },
            ]
        );

        let created = cloud.created_servers();
        assert_eq!(created.len(), 1);
        let opts = &created[0];
        assert_eq!(opts.image, 555);
        assert_eq!(opts.server_type, 22);
        assert_eq!(opts.datacenter, Some(4));
        assert_eq!(opts.ssh_keys, vec![11, 12]);
        assert_eq!(opts.volumes, vec![300, 301]);
        assert_eq!(opts.firewalls, vec![77]);
        assert_eq!(opts.placement_group, Some(9));
        assert_eq!(opts.labels.get("env").map(String::as_str), Some("prod"));
        assert_eq!(
            opts.user_data.as_deref(),
            Some("#cloud-config\nruncmd:\n- [ip, addr, add, 10.0.0.5/32, 10.0.0.6/32, dev, eth0]")
        );
        assert_eq!(
            opts.public_net,
            CreatePublicNet {
                enable_ipv4: true,
                enable_ipv6: false,
                ipv4: Some(100),
                ipv6: None,
            }
        );

        assert!(cloud.floating_ips().iter().all(|f| f.is_assigned_to(1001)));
    }

    /// An explicit dump id is used as given
    #[tokio::test]
    async fn test_unfreeze_explicit_dump() {
        let mut older = sample_dump();
        older.snapshot.id = 444;
        let (_temp_dir, store) = store_with(&[("100", older), ("200", sample_dump())]).await;
        let cloud = Arc::new(cloud());
        let freezer = Freezer::new(cloud.clone(), store);

        freezer.unfreeze("web", Some("100")).await.unwrap();

        assert_eq!(cloud.created_servers()[0].image, 444);
    }

    /// A missing dump fails before any remote call
    #[tokio::test]
    async fn test_missing_dump_makes_no_remote_call() {
        let (_temp_dir, store) = store_with(&[("100", sample_dump())]).await;
        let cloud = Arc::new(cloud());
        let freezer = Freezer::new(cloud.clone(), store);

        let err = freezer.unfreeze("web", Some("999")).await.unwrap_err();

        assert!(matches!(err, FreezerError::DumpNotFound(_)));
        assert!(cloud.calls().is_empty());
    }

    /// An empty dump id selects the latest dump
    #[tokio::test]
    async fn test_empty_dump_id_selects_latest() {
        let mut older = sample_dump();
        older.snapshot.id = 444;
        let (_temp_dir, store) = store_with(&[("100", older), ("200", sample_dump())]).await;
        let cloud = Arc::new(cloud());
        let freezer = Freezer::new(cloud.clone(), store);

        freezer.unfreeze("web", Some("")).await.unwrap();

        let created = cloud.created_servers();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "web");
        assert_eq!(created[0].image, 555);
    }

    /// A dump directory without server.json is rejected before any remote call
    #[tokio::test]
    async fn test_dump_without_server_name_is_rejected() {
        let (temp_dir, store) = store_with(&[]).await;
        std::fs::create_dir_all(temp_dir.path().join("acme/web/300")).unwrap();
        let cloud = Arc::new(cloud());
        let freezer = Freezer::new(cloud.clone(), store);

        let err = freezer.unfreeze("web", Some("300")).await.unwrap_err();

        assert!(matches!(err, FreezerError::InvalidDump(_)));
        assert!(cloud.calls().is_empty());
    }

    /// No dumps fails before any remote call
    #[tokio::test]
    async fn test_no_dumps() {
        let (_temp_dir, store) = store_with(&[]).await;
        let cloud = Arc::new(cloud());
        let freezer = Freezer::new(cloud.clone(), store);

        let err = freezer.unfreeze("web", None).await.unwrap_err();

        assert!(matches!(err, FreezerError::NoDumps(_)));
        assert!(cloud.calls().is_empty());
    }

    /// Without floating IPs there is no user data
    #[tokio::test]
    async fn test_unfreeze_without_floating_ips() {
        let mut dump = sample_dump();
        dump.floating_ips.clear();
        dump.server.private_net.clear();
        let (_temp_dir, store) = store_with(&[("1", dump)]).await;
        let cloud = Arc::new(cloud());
        let freezer = Freezer::new(cloud.clone(), store);

        freezer.unfreeze("web", None).await.unwrap();

        assert_eq!(cloud.mutations(), vec![Call::CreateServer("web".to_string())]);
        assert_eq!(cloud.created_servers()[0].user_data, None);
    }

    /// A failed assignment leaves the new server
    #[tokio::test]
    async fn test_assign_failure_leaves_created_server() {
        let (_temp_dir, store) = store_with(&[("1", sample_dump())]).await;
        let cloud = Arc::new(cloud());
        cloud.fail_on("assign_floating_ip", 409);
        let freezer = Freezer::new(cloud.clone(), store);

        let err = freezer.unfreeze("web", None).await.unwrap_err();

        assert!(matches!(err, FreezerError::Cloud(CloudError::Api { status: 409, .. })));
        assert_eq!(cloud.servers().len(), 1);
        assert_eq!(cloud.count("assign_floating_ip"), 1);
        assert_eq!(cloud.count("attach_server_to_network"), 0);
    }

    /// An unknown floating IP stops before create
    #[tokio::test]
    async fn test_unknown_floating_ip_aborts_before_create() {
        let mut dump = sample_dump();
        dump.floating_ips.push(floating_ip(3, "10.0.0.7", Some(42)));
        let (_temp_dir, store) = store_with(&[("1", dump)]).await;
        let cloud = Arc::new(cloud());
        let freezer = Freezer::new(cloud.clone(), store);

        let err = freezer.unfreeze("web", None).await.unwrap_err();

        assert!(matches!(err, FreezerError::Cloud(CloudError::ResourceNotFound(_))));
        assert_eq!(cloud.count("create_server"), 0);
    }

    /// Public net flags follow the recorded primary IPs
    #[test]
    fn test_public_net_follows_recorded_primary_ips() {
        let mut dump = sample_dump();
        dump.server.public_net.ipv4 = Some(PrimaryIpAssignment::default());
        dump.server.public_net.ipv6 = Some(PrimaryIpAssignment {
            id: 101,
            ..Default::default()
        });

        let opts = create_server_opts(&dump, &[]);

        assert_eq!(
            opts.public_net,
            CreatePublicNet {
                enable_ipv4: false,
                enable_ipv6: true,
                ipv4: None,
                ipv6: Some(101),
            }
        );
        assert_eq!(opts.user_data, None);
    }

    /// Datacenter 0 is omitted
    #[test]
    fn test_unset_datacenter_is_omitted() {
        let mut dump = sample_dump();
        dump.server.datacenter = Default::default();
        dump.server.placement_group = None;

        let opts = create_server_opts(&dump, &[]);

        assert_eq!(opts.datacenter, None);
        assert_eq!(opts.placement_group, None);
    }
}
