//! In-memory control plane for tests
//!
//! Keeps servers, floating IPs, SSH keys and images in memory, records every
//! call in order and lets tests script the states an action goes through.

use crate::action::{Action, ActionStatus};
use crate::error::{CloudError, Result};
use crate::model::{FirewallRef, FloatingIp, Image, PrimaryIpAssignment, PrivateNet, ResourceRef, Server, SshKey};
use crate::provider::{
    AttachToNetworkOpts, ControlPlane, CreateImageOpts, CreateImageResult, CreateServerOpts,
    CreateServerResult,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::net::Ipv4Addr;
use std::sync::{Mutex, MutexGuard};

/// A call received by [`FakeControlPlane`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetServerByName(String),
    ShutdownServer(i64),
    CreateImage(i64),
    ListFloatingIps,
    GetFloatingIp(i64),
    UnassignFloatingIp(i64),
    AssignFloatingIp { floating_ip: i64, server: i64 },
    UnassignPrimaryIp(i64),
    ListSshKeys,
    DeleteServer(i64),
    CreateServer(String),
    AttachToNetwork { server: i64, network: i64, ip: Ipv4Addr },
    GetAction(i64),
}

impl Call {
    /// Operation name, as used by [`FakeControlPlane::fail_on`]
    pub fn operation(&self) -> &'static str {
        match self {
            Call::GetServerByName(_) => "get_server_by_name",
            Call::ShutdownServer(_) => "shutdown_server",
            Call::CreateImage(_) => "create_image",
            Call::ListFloatingIps => "list_floating_ips",
            Call::GetFloatingIp(_) => "get_floating_ip",
            Call::UnassignFloatingIp(_) => "unassign_floating_ip",
            Call::AssignFloatingIp { .. } => "assign_floating_ip",
            Call::UnassignPrimaryIp(_) => "unassign_primary_ip",
            Call::ListSshKeys => "list_ssh_keys",
            Call::DeleteServer(_) => "delete_server",
            Call::CreateServer(_) => "create_server",
            Call::AttachToNetwork { .. } => "attach_server_to_network",
            Call::GetAction(_) => "get_action",
        }
    }
}

struct FakeState {
    next_id: i64,
    initial_status: ActionStatus,
    servers: Vec<Server>,
    floating_ips: Vec<FloatingIp>,
    ssh_keys: Vec<SshKey>,
    images: Vec<Image>,
    actions: HashMap<i64, Action>,
    scripted: HashMap<i64, VecDeque<Action>>,
    failures: HashMap<&'static str, u16>,
    deleted_floating_ips: HashSet<i64>,
    calls: Vec<Call>,
    created: Vec<CreateServerOpts>,
}

/// In-memory [`ControlPlane`]
pub struct FakeControlPlane {
    state: Mutex<FakeState>,
}

impl Default for FakeControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 1000,
                initial_status: ActionStatus::Success,
                servers: Vec::new(),
                floating_ips: Vec::new(),
                ssh_keys: Vec::new(),
                images: Vec::new(),
                actions: HashMap::new(),
                scripted: HashMap::new(),
                failures: HashMap::new(),
                deleted_floating_ips: HashSet::new(),
                calls: Vec::new(),
                created: Vec::new(),
            }),
        }
    }

    pub fn with_server(self, server: Server) -> Self {
        self.state().servers.push(server);
        self
    }

    pub fn with_floating_ip(self, floating_ip: FloatingIp) -> Self {
        self.state().floating_ips.push(floating_ip);
        self
    }

    pub fn with_ssh_key(self, key: SshKey) -> Self {
        self.state().ssh_keys.push(key);
        self
    }

    /// Status of actions started by mutating calls (default: success)
    pub fn with_initial_status(self, status: ActionStatus) -> Self {
        self.state().initial_status = status;
        self
    }

    /// Answer successive polls of action `id` with `states`, repeating the last one
    pub fn script_action(&self, id: i64, states: Vec<Action>) {
        self.state().scripted.insert(id, states.into());
    }

    /// Make every call of `operation` fail with HTTP `status`
    pub fn fail_on(&self, operation: &'static str, status: u16) {
        self.state().failures.insert(operation, status);
    }

    /// Floating IP `id` keeps showing up in listings but is gone when fetched by id
    pub fn delete_floating_ip_behind_listing(&self, id: i64) {
        self.state().deleted_floating_ips.insert(id);
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Calls received so far, excluding action polls
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::GetAction(_)))
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    pub fn created_servers(&self) -> Vec<CreateServerOpts> {
        self.state().created.clone()
    }

    pub fn servers(&self) -> Vec<Server> {
        self.state().servers.clone()
    }

    pub fn floating_ips(&self) -> Vec<FloatingIp> {
        self.state().floating_ips.clone()
    }

    pub fn images(&self) -> Vec<Image> {
        self.state().images.clone()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call` and fail it if a failure was registered for its operation
    fn record(&self, call: Call) -> Result<MutexGuard<'_, FakeState>> {
        let mut state = self.state();
        let operation = call.operation();
        tracing::debug!(?call, "fake control plane call");
        state.calls.push(call);
        if let Some(status) = state.failures.get(operation) {
            return Err(CloudError::Api {
                operation: operation.replace('_', " "),
                status: *status,
                code: None,
                message: None,
            });
        }
        Ok(state)
    }
}

impl FakeState {
    fn start_action(&mut self, command: &str) -> Action {
        self.next_id += 1;
        let action = Action::new(self.next_id, command, self.initial_status);
        self.actions.insert(action.id, action.clone());
        action
    }

    fn next_resource_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn server_mut(&mut self, id: i64) -> Result<&mut Server> {
        self.servers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CloudError::ResourceNotFound(format!("server {}", id)))
    }

    fn floating_ip_mut(&mut self, id: i64) -> Result<&mut FloatingIp> {
        self.floating_ips
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| CloudError::ResourceNotFound(format!("floating ip {}", id)))
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn get_server_by_name(&self, name: &str) -> Result<Option<Server>> {
        let state = self.record(Call::GetServerByName(name.to_string()))?;
        Ok(state.servers.iter().find(|s| s.name == name).cloned())
    }

    async fn shutdown_server(&self, server_id: i64) -> Result<Action> {
        let mut state = self.record(Call::ShutdownServer(server_id))?;
        state.server_mut(server_id)?.status = "off".to_string();
        Ok(state.start_action("shutdown_server"))
    }

    async fn create_image(&self, server_id: i64, opts: &CreateImageOpts) -> Result<CreateImageResult> {
        let mut state = self.record(Call::CreateImage(server_id))?;
        state.server_mut(server_id)?;
        let image = Image {
            id: state.next_resource_id(),
            image_type: opts.image_type.clone(),
            status: "available".to_string(),
            description: opts.description.clone(),
            ..Default::default()
        };
        state.images.push(image.clone());
        let action = state.start_action("create_image");
        Ok(CreateImageResult { image, action })
    }

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>> {
        let state = self.record(Call::ListFloatingIps)?;
        Ok(state.floating_ips.clone())
    }

    async fn get_floating_ip(&self, id: i64) -> Result<Option<FloatingIp>> {
        let state = self.record(Call::GetFloatingIp(id))?;
        if state.deleted_floating_ips.contains(&id) {
            return Ok(None);
        }
        Ok(state.floating_ips.iter().find(|f| f.id == id).cloned())
    }

    async fn unassign_floating_ip(&self, id: i64) -> Result<Action> {
        let mut state = self.record(Call::UnassignFloatingIp(id))?;
        state.floating_ip_mut(id)?.server = None;
        Ok(state.start_action("unassign_floating_ip"))
    }

    async fn assign_floating_ip(&self, id: i64, server_id: i64) -> Result<Action> {
        let mut state = self.record(Call::AssignFloatingIp {
            floating_ip: id,
            server: server_id,
        })?;
        state.server_mut(server_id)?;
        state.floating_ip_mut(id)?.server = Some(server_id);
        Ok(state.start_action("assign_floating_ip"))
    }

    async fn unassign_primary_ip(&self, id: i64) -> Result<Action> {
        let mut state = self.record(Call::UnassignPrimaryIp(id))?;
        for server in state.servers.iter_mut() {
            if server.public_net.ipv4_id() == Some(id) {
                server.public_net.ipv4 = None;
            }
            if server.public_net.ipv6_id() == Some(id) {
                server.public_net.ipv6 = None;
            }
        }
        Ok(state.start_action("unassign_primary_ip"))
    }

    async fn list_ssh_keys(&self) -> Result<Vec<SshKey>> {
        let state = self.record(Call::ListSshKeys)?;
        Ok(state.ssh_keys.clone())
    }

    async fn delete_server(&self, server_id: i64) -> Result<Action> {
        let mut state = self.record(Call::DeleteServer(server_id))?;
        state.server_mut(server_id)?;
        state.servers.retain(|s| s.id != server_id);
        Ok(state.start_action("delete_server"))
    }

    async fn create_server(&self, opts: &CreateServerOpts) -> Result<CreateServerResult> {
        let mut state = self.record(Call::CreateServer(opts.name.clone()))?;
        let id = state.next_resource_id();
        let mut server = Server {
            id,
            name: opts.name.clone(),
            status: "running".to_string(),
            server_type: ResourceRef::new(opts.server_type),
            datacenter: ResourceRef::new(opts.datacenter.unwrap_or_default()),
            placement_group: opts.placement_group.map(ResourceRef::new),
            labels: opts.labels.clone(),
            volumes: opts.volumes.clone(),
            ..Default::default()
        };
        server.public_net.ipv4 = opts.public_net.ipv4.map(|id| PrimaryIpAssignment {
            id,
            ..Default::default()
        });
        server.public_net.ipv6 = opts.public_net.ipv6.map(|id| PrimaryIpAssignment {
            id,
            ..Default::default()
        });
        server.public_net.firewalls = opts
            .firewalls
            .iter()
            .map(|id| FirewallRef {
                id: *id,
                status: "applied".to_string(),
            })
            .collect();
        state.servers.push(server.clone());
        state.created.push(opts.clone());
        let action = state.start_action("create_server");
        Ok(CreateServerResult { server, action })
    }

    async fn attach_server_to_network(
        &self,
        server_id: i64,
        opts: &AttachToNetworkOpts,
    ) -> Result<Action> {
        let mut state = self.record(Call::AttachToNetwork {
            server: server_id,
            network: opts.network,
            ip: opts.ip,
        })?;
        state.server_mut(server_id)?.private_net.push(PrivateNet {
            network: opts.network,
            ip: opts.ip.to_string(),
            alias_ips: Vec::new(),
        });
        Ok(state.start_action("attach_to_network"))
    }

    async fn get_action(&self, id: i64) -> Result<Action> {
        let mut state = self.record(Call::GetAction(id))?;
        if let Some(queue) = state.scripted.get_mut(&id) {
            let next = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(action) = next {
                return Ok(action);
            }
        }
        match state.actions.get(&id) {
            Some(action) => Ok(Action::new(action.id, action.command.clone(), ActionStatus::Success)),
            None => Err(CloudError::Api {
                operation: "get action".to_string(),
                status: 404,
                code: Some("not_found".to_string()),
                message: Some(format!("action {} not found", id)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted action states repeat the last one
    #[tokio::test]
    async fn test_scripted_action_repeats_last_state() {
        let cloud = FakeControlPlane::new();
        cloud.script_action(
            7,
            vec![
                Action::new(7, "create_image", ActionStatus::Running),
                Action::new(7, "create_image", ActionStatus::Success),
            ],
        );

        assert_eq!(cloud.get_action(7).await.unwrap().status, ActionStatus::Running);
        assert_eq!(cloud.get_action(7).await.unwrap().status, ActionStatus::Success);
        assert_eq!(cloud.get_action(7).await.unwrap().status, ActionStatus::Success);
        assert_eq!(cloud.count("get_action"), 3);
    }

    /// Registered failures are returned and recorded
    #[tokio::test]
    async fn test_registered_failure() {
        let cloud = FakeControlPlane::new();
        cloud.fail_on("list_ssh_keys", 503);

        let err = cloud.list_ssh_keys().await.unwrap_err();
        assert!(matches!(err, CloudError::Api { status: 503, .. }));
        assert_eq!(cloud.calls(), vec![Call::ListSshKeys]);
    }

    /// A floating IP deleted after listing is listed but not found by id
    #[tokio::test]
    async fn test_floating_ip_deleted_behind_listing() {
        let cloud = FakeControlPlane::new().with_floating_ip(FloatingIp {
            id: 1,
            ip: "10.0.0.5".to_string(),
            server: Some(42),
            ..Default::default()
        });
        cloud.delete_floating_ip_behind_listing(1);

        assert_eq!(cloud.list_floating_ips().await.unwrap().len(), 1);
        assert_eq!(cloud.get_floating_ip(1).await.unwrap(), None);
    }
}
