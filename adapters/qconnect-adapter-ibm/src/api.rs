//! IBM Quantum Platform API client.
//!
//! This module implements the parts of the IBM Quantum REST API the
//! connector needs:
//! - Authentication via IAM token exchange (Cloud API key flow)
//! - Listing backends with their configuration and queue status
//!
//! Supports both the Cloud API (`quantum.cloud.ibm.com/api`) and the legacy
//! endpoint (`api.quantum-computing.ibm.com`).

use std::fmt;
use std::time::Duration;

use reqwest::{Client, header};
use serde::Deserialize;

use qconnect_core::BackendHandle;

use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum API endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

/// IBM Cloud IAM token endpoint.
pub const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// IBM API version header value.
const IBM_API_VERSION: &str = "2026-02-01";

/// User-Agent sent with requests (Cloudflare blocks default reqwest UA).
const USER_AGENT: &str = concat!("qconnect/", env!("CARGO_PKG_VERSION"));

/// Endpoints used by the client. Overridable for tests and private deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Cloud API base URL.
    pub cloud: String,
    /// Legacy API base URL.
    pub legacy: String,
    /// IAM token URL.
    pub iam: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            cloud: DEFAULT_ENDPOINT.to_string(),
            legacy: LEGACY_ENDPOINT.to_string(),
            iam: IAM_TOKEN_URL.to_string(),
        }
    }
}

/// IBM Quantum API client.
pub struct IbmClient {
    /// HTTP client.
    client: Client,
    /// API endpoint URL.
    endpoint: String,
    /// Selected instance (hub/group/project), legacy mode only.
    instance: Option<String>,
    /// Whether using the Cloud API (vs legacy).
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("cloud_api", &self.cloud_api)
            .finish()
    }
}

/// IAM token response from `iam.cloud.ibm.com`.
#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

fn base_headers(bearer: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {bearer}"))
            .map_err(|_| IbmError::InvalidToken)?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn build_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

impl IbmClient {
    /// Create a client for the legacy endpoint using a direct bearer token.
    pub fn new(endpoint: impl Into<String>, token: &str) -> IbmResult<Self> {
        if token.trim().is_empty() {
            return Err(IbmError::MissingToken);
        }
        let client = build_client(base_headers(token)?)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            instance: None,
            cloud_api: false,
        })
    }

    /// Create a client for the Cloud API.
    ///
    /// Exchanges the API key for an IAM bearer token and configures the
    /// Service-CRN header required on every Cloud API request.
    pub async fn connect(endpoints: &Endpoints, api_key: &str, service_crn: &str) -> IbmResult<Self> {
        if api_key.trim().is_empty() {
            return Err(IbmError::MissingToken);
        }

        let iam_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let iam_response = iam_client
            .post(&endpoints.iam)
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !iam_response.status().is_success() {
            let status = iam_response.status();
            let body = iam_response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }

        let iam_token: IamTokenResponse = iam_response.json().await.map_err(|e| {
            IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}"))
        })?;

        let mut headers = base_headers(&iam_token.access_token)?;
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        tracing::debug!("IAM token exchange succeeded");

        Ok(Self {
            client: build_client(headers)?,
            endpoint: endpoints.cloud.clone(),
            instance: None,
            cloud_api: true,
        })
    }

    /// Set the instance (hub/group/project) for legacy requests.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        let instance = instance.into();
        self.instance = (!instance.trim().is_empty()).then_some(instance);
        self
    }

    /// Whether this client uses the Cloud API.
    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    /// Get available backends.
    ///
    /// On the Cloud API this fetches the device list and then the
    /// configuration and status of each device individually.
    pub async fn list_backends(&self) -> IbmResult<Vec<BackendInfo>> {
        if self.cloud_api {
            self.list_backends_cloud().await
        } else {
            self.list_backends_legacy().await
        }
    }

    /// List backends using the Cloud API (`{"devices": [...]}`).
    async fn list_backends_cloud(&self) -> IbmResult<Vec<BackendInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::ApiError {
                code: None,
                message: format!("list backends failed: {body}"),
            });
        }

        let devices: DevicesResponse = response.json().await?;
        let mut backends = Vec::with_capacity(devices.devices.len());

        for device in &devices.devices {
            let device_name = &device.name;
            match self.get_backend_cloud(device_name).await {
                Ok(info) => backends.push(info),
                Err(e) => {
                    tracing::warn!("skipping backend {device_name}: {e}");
                }
            }
        }

        Ok(backends)
    }

    /// List backends using the legacy API (`{"backends": [...]}`).
    async fn list_backends_legacy(&self) -> IbmResult<Vec<BackendInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);

        let mut request = self.client.get(&url);
        if let Some(instance) = &self.instance {
            request = request.query(&[("instance", instance.as_str())]);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let error: ApiErrorResponse = response.json().await?;
            return Err(IbmError::ApiError {
                code: error.code,
                message: error.message,
            });
        }

        let backends: LegacyBackendsResponse = response.json().await?;
        Ok(backends.backends)
    }

    /// Fetch backend info from the Cloud API.
    ///
    /// Merges `/configuration` and `/status` into a single [`BackendInfo`].
    async fn get_backend_cloud(&self, name: &str) -> IbmResult<BackendInfo> {
        let config_url = format!("{}/v1/backends/{}/configuration", self.endpoint, name);
        let config_response = self.client.get(&config_url).send().await?;

        if !config_response.status().is_success() {
            if config_response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(IbmError::BackendUnavailable(name.to_string()));
            }
            let body = config_response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::ApiError {
                code: None,
                message: format!("backend configuration failed for {name}: {body}"),
            });
        }

        let config: BackendConfigResponse = config_response.json().await?;

        let status_url = format!("{}/v1/backends/{}/status", self.endpoint, name);
        let status_response = self.client.get(&status_url).send().await?;

        let status = if status_response.status().is_success() {
            let s: BackendStatusResponse = status_response.json().await?;
            BackendStatus {
                operational: s.state,
                status_msg: Some(s.status),
                pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
            }
        } else {
            // Configuration succeeded; an unreadable status is not fatal.
            BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: None,
            }
        };

        Ok(BackendInfo {
            name: config.backend_name,
            backend_version: config.backend_version,
            num_qubits: config.n_qubits,
            status,
            simulator: config.simulator.unwrap_or(false),
        })
    }
}

// ============================================================================
// Response types
// ============================================================================

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Cloud API device list (`{"devices": [...]}`).
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

/// A device entry in the Cloud API listing.
#[derive(Debug, Deserialize)]
struct DeviceEntry {
    /// Device name (e.g. "ibm_torino").
    name: String,
}

/// Legacy API backends list (`{"backends": [...]}`).
#[derive(Debug, Deserialize)]
struct LegacyBackendsResponse {
    backends: Vec<BackendInfo>,
}

/// Cloud API `/backends/{name}/configuration`.
#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    #[serde(default)]
    backend_version: Option<String>,
    #[serde(default)]
    n_qubits: Option<usize>,
    #[serde(default)]
    simulator: Option<bool>,
}

/// Cloud API `/backends/{name}/status`.
#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    length_queue: u64,
}

/// Backend information.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Backend software version.
    #[serde(default)]
    pub backend_version: Option<String>,
    /// Number of qubits.
    #[serde(default)]
    pub num_qubits: Option<usize>,
    /// Backend status.
    pub status: BackendStatus,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
}

/// Backend status.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the backend is operational.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

impl From<BackendInfo> for BackendHandle {
    fn from(info: BackendInfo) -> Self {
        BackendHandle {
            name: info.name,
            version: info.backend_version,
            num_qubits: info.num_qubits,
            pending_jobs: info.status.pending_jobs,
            operational: info.status.operational,
            simulator: info.simulator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devices_response_deserialization() {
        let json = r#"{"devices": [
            {"name": "ibm_fez", "status": {"name": "online"}},
            {"name": "ibm_marrakesh", "status": {"name": "online"}},
            {"name": "ibm_torino", "status": {"name": "online"}}
        ]}"#;
        let resp: DevicesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.devices.len(), 3);
        assert_eq!(resp.devices[2].name, "ibm_torino");
    }

    #[test]
    fn test_backend_config_response_deserialization() {
        let json = r#"{
            "backend_name": "ibm_torino",
            "backend_version": "1.0.31",
            "n_qubits": 133,
            "basis_gates": ["cz", "id", "rx", "rz", "rzz", "sx", "x"],
            "simulator": false
        }"#;
        let config: BackendConfigResponse = serde_json::from_str(json).unwrap();
        assert_eq!(config.backend_name, "ibm_torino");
        assert_eq!(config.backend_version.as_deref(), Some("1.0.31"));
        assert_eq!(config.n_qubits, Some(133));
        assert_eq!(config.simulator, Some(false));
    }

    #[test]
    fn test_backend_status_response_deserialization() {
        let json = r#"{
            "state": true,
            "status": "active",
            "message": "ready",
            "length_queue": 4
        }"#;
        let status: BackendStatusResponse = serde_json::from_str(json).unwrap();
        assert!(status.state);
        assert_eq!(status.status, "active");
        assert_eq!(status.length_queue, 4);
    }

    #[test]
    fn test_legacy_backends_deserialization() {
        let json = r#"{"backends": [
            {"name": "ibm_kyoto", "num_qubits": 127,
             "status": {"operational": true, "pending_jobs": 12}}
        ]}"#;
        let resp: LegacyBackendsResponse = serde_json::from_str(json).unwrap();
        let handle = BackendHandle::from(resp.backends[0].clone());
        assert_eq!(handle.name, "ibm_kyoto");
        assert_eq!(handle.num_qubits, Some(127));
        assert_eq!(handle.pending_jobs, Some(12));
        assert_eq!(handle.version, None);
    }

    #[test]
    fn test_default_endpoint_is_cloud() {
        assert!(Endpoints::default().cloud.contains("quantum.cloud.ibm.com"));
    }

    #[test]
    fn test_legacy_client_is_not_cloud() {
        let client = IbmClient::new("https://example.com", "test-token").unwrap();
        assert!(!client.is_cloud_api());
    }

    #[test]
    fn test_legacy_client_requires_token() {
        let err = IbmClient::new("https://example.com", "  ").unwrap_err();
        assert!(matches!(err, IbmError::MissingToken));
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = IbmClient::new("https://example.com", "super-secret").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_blank_instance_is_ignored() {
        let client = IbmClient::new("https://example.com", "t")
            .unwrap()
            .with_instance("");
        assert!(client.instance.is_none());
    }
}
