//! Hetzner Cloud API client
//!
//! Bearer token authentication against the public REST API. Every call maps
//! to exactly one request, apart from list endpoints which follow
//! `meta.pagination.next_page` until the last page.

use crate::error::HcloudError;
use crate::schema::{
    ActionResponse, AssignFloatingIpRequest, AttachToNetworkRequest, CreateImageResponse,
    CreateServerRequest, CreateServerResponse, ErrorResponse, FloatingIpList, FloatingIpResponse,
    Page, ServerList, SshKeyList,
};
use async_trait::async_trait;
use freezer_cloud::{
    Action, AttachToNetworkOpts, CloudError, ControlPlane, CreateImageOpts, CreateImageResult,
    CreateServerOpts, CreateServerResult, FloatingIp, Result, Server, SshKey, ensure_success,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const HETZNER_API_BASE: &str = "https://api.hetzner.cloud/v1";

/// Page size requested from list endpoints
pub const PER_PAGE: u32 = 50;

/// [`ControlPlane`] backed by the Hetzner Cloud API
pub struct HetznerCloud {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl HetznerCloud {
    pub fn new(token: impl Into<String>) -> std::result::Result<Self, HcloudError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(HcloudError::MissingToken);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("freezer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            token,
            endpoint: HETZNER_API_BASE.to_string(),
        })
    }

    /// Send requests to `endpoint` instead of the public API
    pub fn with_endpoint(
        mut self,
        endpoint: impl Into<String>,
    ) -> std::result::Result<Self, HcloudError> {
        let endpoint = endpoint.into();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(HcloudError::InvalidEndpoint(endpoint));
        }
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(HcloudError::from)?;
        check_status(operation, response).await
    }

    async fn get<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<T> {
        let response = self.send(operation, self.request(Method::GET, path)).await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.request(Method::POST, path).json(body);
        let response = self.send(operation, request).await?;
        decode(response).await
    }

    /// Action started by a request without body
    async fn action(&self, operation: &str, method: Method, path: &str) -> Result<Action> {
        let response = self.send(operation, self.request(method, path)).await?;
        let body: ActionResponse = decode(response).await?;
        Ok(body.action)
    }

    async fn list<P: Page + DeserializeOwned>(&self, operation: &str, path: &str) -> Result<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let request = self
                .request(Method::GET, path)
                .query(&[("page", page), ("per_page", PER_PAGE)]);
            let response = self.send(operation, request).await?;
            let body: P = decode(response).await?;
            let (mut batch, next) = body.into_parts();
            items.append(&mut batch);

            match next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }
        Ok(items)
    }
}

/// Turn a non-success response into [`CloudError::Api`], keeping the API's
/// error code and message when the body carries them
async fn check_status(operation: &str, response: Response) -> Result<Response> {
    let status = response.status().as_u16();
    if ensure_success(operation, status).is_ok() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(e) => (Some(e.error.code), Some(e.error.message)),
        Err(_) => (None, None),
    };
    tracing::debug!("{} failed with status {}: {}", operation, status, body);

    Err(CloudError::Api {
        operation: operation.to_string(),
        status,
        code,
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(HcloudError::from)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl ControlPlane for HetznerCloud {
    async fn get_server_by_name(&self, name: &str) -> Result<Option<Server>> {
        let request = self.request(Method::GET, "/servers").query(&[("name", name)]);
        let response = self.send("get server", request).await?;
        let body: ServerList = decode(response).await?;
        Ok(body.servers.into_iter().next())
    }

    async fn shutdown_server(&self, server_id: i64) -> Result<Action> {
        self.action(
            "shutdown server",
            Method::POST,
            &format!("/servers/{}/actions/shutdown", server_id),
        )
        .await
    }

    async fn create_image(&self, server_id: i64, opts: &CreateImageOpts) -> Result<CreateImageResult> {
        let body: CreateImageResponse = self
            .post(
                "create image",
                &format!("/servers/{}/actions/create_image", server_id),
                opts,
            )
            .await?;
        Ok(CreateImageResult {
            image: body.image,
            action: body.action,
        })
    }

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>> {
        self.list::<FloatingIpList>("list floating ips", "/floating_ips").await
    }

    async fn get_floating_ip(&self, id: i64) -> Result<Option<FloatingIp>> {
        let request = self.request(Method::GET, &format!("/floating_ips/{}", id));
        let response = request.send().await.map_err(HcloudError::from)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status("get floating ip", response).await?;
        let body: FloatingIpResponse = decode(response).await?;
        Ok(Some(body.floating_ip))
    }

    async fn unassign_floating_ip(&self, id: i64) -> Result<Action> {
        self.action(
            "unassign floating ip",
            Method::POST,
            &format!("/floating_ips/{}/actions/unassign", id),
        )
        .await
    }

    async fn assign_floating_ip(&self, id: i64, server_id: i64) -> Result<Action> {
        let body: ActionResponse = self
            .post(
                "assign floating ip",
                &format!("/floating_ips/{}/actions/assign", id),
                &AssignFloatingIpRequest { server: server_id },
            )
            .await?;
        Ok(body.action)
    }

    async fn unassign_primary_ip(&self, id: i64) -> Result<Action> {
        self.action(
            "unassign primary ip",
            Method::POST,
            &format!("/primary_ips/{}/actions/unassign", id),
        )
        .await
    }

    async fn list_ssh_keys(&self) -> Result<Vec<SshKey>> {
        self.list::<SshKeyList>("list ssh keys", "/ssh_keys").await
    }

    async fn delete_server(&self, server_id: i64) -> Result<Action> {
        self.action("delete server", Method::DELETE, &format!("/servers/{}", server_id))
            .await
    }

    async fn create_server(&self, opts: &CreateServerOpts) -> Result<CreateServerResult> {
        let request = CreateServerRequest::from(opts);
        let body: CreateServerResponse = self
            .post("create server", "/servers", &request)
            .await?;
        Ok(CreateServerResult {
            server: body.server,
            action: body.action,
        })
    }

    async fn attach_server_to_network(
        &self,
        server_id: i64,
        opts: &AttachToNetworkOpts,
    ) -> Result<Action> {
        let request = AttachToNetworkRequest {
            network: opts.network,
            ip: opts.ip.to_string(),
        };
        let body: ActionResponse = self
            .post(
                "attach server to network",
                &format!("/servers/{}/actions/attach_to_network", server_id),
                &request,
            )
            .await?;
        Ok(body.action)
    }

    async fn get_action(&self, id: i64) -> Result<Action> {
        let body: ActionResponse = self.get("get action", &format!("/actions/{}", id)).await?;
        Ok(body.action)
    }
}
