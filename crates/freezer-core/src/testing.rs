//! Shared fixtures for unit tests

use crate::dump::ServerDump;
use freezer_cloud::{
    FirewallRef, FloatingIp, Image, PrimaryIpAssignment, PrivateNet, PublicNet, ResourceRef,
    Server, SshKey,
};
use std::collections::BTreeMap;

pub fn sample_server() -> Server {
    Server {
        id: 42,
        name: "web".to_string(),
        status: "running".to_string(),
        server_type: ResourceRef::named(22, "cx22"),
        datacenter: ResourceRef::named(4, "fsn1-dc14"),
        placement_group: Some(ResourceRef::new(9)),
        labels: BTreeMap::from([("env".to_string(), "prod".to_string())]),
        volumes: vec![300, 301],
        private_net: vec![
            PrivateNet {
                network: 5,
                ip: "10.0.0.2".to_string(),
                alias_ips: Vec::new(),
            },
            PrivateNet {
                network: 6,
                ip: "not-an-ip".to_string(),
                alias_ips: Vec::new(),
            },
        ],
        public_net: PublicNet {
            ipv4: Some(PrimaryIpAssignment {
                id: 100,
                ip: "203.0.113.10".to_string(),
                blocked: false,
            }),
            ipv6: None,
            floating_ips: vec![1, 2],
            firewalls: vec![FirewallRef {
                id: 77,
                status: "applied".to_string(),
            }],
        },
    }
}

pub fn floating_ip(id: i64, ip: &str, server: Option<i64>) -> FloatingIp {
    FloatingIp {
        id,
        name: format!("fip-{}", id),
        ip: ip.to_string(),
        ip_type: "ipv4".to_string(),
        server,
        ..Default::default()
    }
}

pub fn ssh_key(id: i64, name: &str) -> SshKey {
    SshKey {
        id,
        name: name.to_string(),
        fingerprint: format!("b7:2f:30:a0:{:02x}", id),
        public_key: format!("ssh-ed25519 AAAA{} {}", id, name),
        ..Default::default()
    }
}

pub fn sample_dump() -> ServerDump {
    ServerDump {
        server: sample_server(),
        floating_ips: vec![
            floating_ip(1, "10.0.0.5", Some(42)),
            floating_ip(2, "10.0.0.6", Some(42)),
        ],
        ssh_keys: vec![ssh_key(11, "alice"), ssh_key(12, "bob")],
        snapshot: Image {
            id: 555,
            image_type: "snapshot".to_string(),
            status: "available".to_string(),
            description: "2024-01-01 12:00:00".to_string(),
            ..Default::default()
        },
    }
}
