//! Control plane resources
//!
//! Field names follow the Hetzner Cloud API schema, so the same types
//! deserialize API responses and serialize server dumps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to another resource by id (server type, datacenter, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl ResourceRef {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }

    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A compute server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub server_type: ResourceRef,
    pub datacenter: ResourceRef,
    pub placement_group: Option<ResourceRef>,
    pub labels: BTreeMap<String, String>,
    /// Ids of attached volumes
    pub volumes: Vec<i64>,
    pub private_net: Vec<PrivateNet>,
    pub public_net: PublicNet,
}

/// Attachment of a server to a private network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateNet {
    /// Network id
    pub network: i64,

    /// IPv4 address assigned in that network, as reported by the API
    #[serde(default)]
    pub ip: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias_ips: Vec<String>,
}

/// Public network configuration of a server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicNet {
    pub ipv4: Option<PrimaryIpAssignment>,
    pub ipv6: Option<PrimaryIpAssignment>,
    /// Ids of floating IPs pointing at the server
    pub floating_ips: Vec<i64>,
    pub firewalls: Vec<FirewallRef>,
}

impl PublicNet {
    /// Id of the assigned primary IPv4, `None` when absent or zero
    pub fn ipv4_id(&self) -> Option<i64> {
        self.ipv4.as_ref().map(|ip| ip.id).filter(|id| *id != 0)
    }

    /// Id of the assigned primary IPv6, `None` when absent or zero
    pub fn ipv6_id(&self) -> Option<i64> {
        self.ipv6.as_ref().map(|ip| ip.id).filter(|id| *id != 0)
    }
}

/// Primary IP bound to a server's public interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryIpAssignment {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub ip: String,

    #[serde(default)]
    pub blocked: bool,
}

/// Firewall applied to a server's public interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRef {
    pub id: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

/// Floating IP
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingIp {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub ip: String,
    #[serde(rename = "type")]
    pub ip_type: String,
    /// Server the IP is currently assigned to
    pub server: Option<i64>,
    pub blocked: bool,
    pub labels: BTreeMap<String, String>,
}

impl FloatingIp {
    pub fn is_assigned_to(&self, server_id: i64) -> bool {
        self.server == Some(server_id)
    }
}

/// SSH key registered in the project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshKey {
    pub id: i64,
    pub name: String,
    pub fingerprint: String,
    pub public_key: String,
    pub labels: BTreeMap<String, String>,
}

/// Image (snapshot or backup) of a server disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub id: i64,
    #[serde(rename = "type")]
    pub image_type: String,
    pub status: String,
    pub description: String,
    pub labels: BTreeMap<String, String>,
}
