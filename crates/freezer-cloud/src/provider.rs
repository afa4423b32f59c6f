//! Control plane trait definition

use crate::action::Action;
use crate::error::Result;
use crate::model::{FloatingIp, Image, Server, SshKey};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Remote capability surface consumed by the orchestration engine
///
/// Every mutating call returns the [`Action`] the control plane started for
/// it. Implementations map any response outside the 200-201 range to
/// [`crate::CloudError::Api`].
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Look up a server by its name
    async fn get_server_by_name(&self, name: &str) -> Result<Option<Server>>;

    /// Gracefully shut a server down
    async fn shutdown_server(&self, server_id: i64) -> Result<Action>;

    /// Create an image from a server's disk
    async fn create_image(&self, server_id: i64, opts: &CreateImageOpts) -> Result<CreateImageResult>;

    /// List every floating IP in the project
    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>>;

    /// Get a floating IP by id
    async fn get_floating_ip(&self, id: i64) -> Result<Option<FloatingIp>>;

    async fn unassign_floating_ip(&self, id: i64) -> Result<Action>;

    async fn assign_floating_ip(&self, id: i64, server_id: i64) -> Result<Action>;

    /// Detach a primary IP from the server it is bound to
    async fn unassign_primary_ip(&self, id: i64) -> Result<Action>;

    /// List every SSH key in the project
    async fn list_ssh_keys(&self) -> Result<Vec<SshKey>>;

    async fn delete_server(&self, server_id: i64) -> Result<Action>;

    async fn create_server(&self, opts: &CreateServerOpts) -> Result<CreateServerResult>;

    /// Attach a server to a private network, requesting a fixed address
    async fn attach_server_to_network(
        &self,
        server_id: i64,
        opts: &AttachToNetworkOpts,
    ) -> Result<Action>;

    /// Fetch the current state of an action
    async fn get_action(&self, id: i64) -> Result<Action>;
}

/// Options for creating an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateImageOpts {
    pub description: String,

    /// "snapshot" or "backup"
    #[serde(rename = "type")]
    pub image_type: String,
}

impl CreateImageOpts {
    pub fn snapshot(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            image_type: "snapshot".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateImageResult {
    pub image: Image,
    pub action: Action,
}

/// Options for creating a server
///
/// Every referenced resource is given by id only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateServerOpts {
    pub name: String,
    pub server_type: i64,
    pub image: i64,
    pub datacenter: Option<i64>,
    pub ssh_keys: Vec<i64>,
    pub user_data: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub volumes: Vec<i64>,
    pub firewalls: Vec<i64>,
    pub placement_group: Option<i64>,
    pub public_net: CreatePublicNet,
}

/// Public network options for a new server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePublicNet {
    pub enable_ipv4: bool,
    pub enable_ipv6: bool,
    /// Existing primary IPv4 to bind
    pub ipv4: Option<i64>,
    /// Existing primary IPv6 to bind
    pub ipv6: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreateServerResult {
    pub server: Server,
    pub action: Action,
}

/// Options for attaching a server to a private network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachToNetworkOpts {
    pub network: i64,
    pub ip: Ipv4Addr,
}
