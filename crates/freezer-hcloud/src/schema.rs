//! Request and response bodies of the Hetzner Cloud API

use freezer_cloud::{
    Action, CreatePublicNet, CreateServerOpts, FloatingIp, Image, Server, SshKey,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Pagination {
    #[serde(default)]
    pub next_page: Option<u32>,
}

/// One page of a list endpoint
pub(crate) trait Page {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<u32>);
}

macro_rules! page {
    ($name:ident, $field:ident, $item:ty) => {
        #[derive(Debug, Deserialize)]
        pub(crate) struct $name {
            #[serde(default)]
            pub $field: Vec<$item>,
            #[serde(default)]
            pub meta: Meta,
        }

        impl Page for $name {
            type Item = $item;

            fn into_parts(self) -> (Vec<$item>, Option<u32>) {
                let next = self.meta.pagination.and_then(|p| p.next_page);
                (self.$field, next)
            }
        }
    };
}

page!(ServerList, servers, Server);
page!(FloatingIpList, floating_ips, FloatingIp);
page!(SshKeyList, ssh_keys, SshKey);

#[derive(Debug, Deserialize)]
pub(crate) struct ActionResponse {
    pub action: Action,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FloatingIpResponse {
    pub floating_ip: FloatingIp,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateImageResponse {
    pub image: Image,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateServerResponse {
    pub server: Server,
    pub action: Action,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignFloatingIpRequest {
    pub server: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttachToNetworkRequest {
    pub network: i64,
    pub ip: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateServerRequest {
    pub name: String,
    pub server_type: i64,
    pub image: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<i64>,
    pub ssh_keys: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub volumes: Vec<i64>,
    pub firewalls: Vec<FirewallRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_group: Option<i64>,
    pub public_net: PublicNetRequest,
    pub start_after_create: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct FirewallRequest {
    pub firewall: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublicNetRequest {
    pub enable_ipv4: bool,
    pub enable_ipv6: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<i64>,
}

impl From<&CreatePublicNet> for PublicNetRequest {
    fn from(net: &CreatePublicNet) -> Self {
        Self {
            enable_ipv4: net.enable_ipv4,
            enable_ipv6: net.enable_ipv6,
            ipv4: net.ipv4,
            ipv6: net.ipv6,
        }
    }
}

impl From<&CreateServerOpts> for CreateServerRequest {
    fn from(opts: &CreateServerOpts) -> Self {
        Self {
            name: opts.name.clone(),
            server_type: opts.server_type,
            image: opts.image,
            datacenter: opts.datacenter,
            ssh_keys: opts.ssh_keys.clone(),
            user_data: opts.user_data.clone(),
            labels: opts.labels.clone(),
            volumes: opts.volumes.clone(),
            firewalls: opts
                .firewalls
                .iter()
                .map(|id| FirewallRequest { firewall: *id })
                .collect(),
            placement_group: opts.placement_group,
            public_net: PublicNetRequest::from(&opts.public_net),
            start_after_create: true,
        }
    }
}
