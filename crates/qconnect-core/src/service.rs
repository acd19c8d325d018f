//! Compute-service abstraction.
//!
//! ```text
//!   ServiceProvider::open(credentials) ──→ BackendService
//!                                            ├── backends()
//!                                            ├── least_busy()    (provided)
//!                                            └── save_account()
//! ```
//!
//! Real adapters and test doubles implement the same two traits, so the
//! connector never depends on a concrete SDK.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credentials::CredentialRecord;
use crate::error::ConnectorResult;

/// Identity of a remote compute resource as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHandle {
    /// Backend name (e.g. "ibm_torino").
    pub name: String,
    /// Backend software version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Number of qubits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_qubits: Option<usize>,
    /// Jobs waiting in the backend queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_jobs: Option<u32>,
    /// Whether the backend accepts jobs.
    #[serde(default = "default_true")]
    pub operational: bool,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
}

fn default_true() -> bool {
    true
}

impl BackendHandle {
    /// Create an operational hardware backend with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            num_qubits: None,
            pending_jobs: None,
            operational: true,
            simulator: false,
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the qubit count.
    pub fn with_qubits(mut self, num_qubits: usize) -> Self {
        self.num_qubits = Some(num_qubits);
        self
    }

    /// Set the queue length.
    pub fn with_pending_jobs(mut self, pending_jobs: u32) -> Self {
        self.pending_jobs = Some(pending_jobs);
        self
    }

    /// Set the operational flag.
    pub fn with_operational(mut self, operational: bool) -> Self {
        self.operational = operational;
        self
    }

    /// Set the simulator flag.
    pub fn with_simulator(mut self, simulator: bool) -> Self {
        self.simulator = simulator;
        self
    }

    /// Display summary of the identifying fields.
    pub fn summary(&self) -> BackendSummary<'_> {
        BackendSummary(self)
    }
}

/// `name  qubits=N  version=V`, with `n/a` for absent fields.
pub struct BackendSummary<'a>(&'a BackendHandle);

impl fmt::Display for BackendSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handle = self.0;
        let qubits = handle
            .num_qubits
            .map_or_else(|| "n/a".to_string(), |n| n.to_string());
        let version = handle.version.as_deref().unwrap_or("n/a");
        write!(f, "{}  qubits={qubits}  version={version}", handle.name)
    }
}

/// Pick the operational hardware backend with the shortest queue.
///
/// Unknown queue lengths sort last; ties keep the first listed backend.
pub fn pick_least_busy(backends: &[BackendHandle]) -> Option<&BackendHandle> {
    backends
        .iter()
        .filter(|b| b.operational && !b.simulator)
        .min_by_key(|b| b.pending_jobs.unwrap_or(u32::MAX))
}

/// Options for persisting an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Mark the saved entry as the default account.
    pub set_as_default: bool,
    /// Replace an existing entry with the same name.
    pub overwrite: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            set_as_default: true,
            overwrite: true,
        }
    }
}

/// A session against a compute service.
#[async_trait]
pub trait BackendService: Send + Sync {
    /// All backends visible to the session.
    async fn backends(&self) -> ConnectorResult<Vec<BackendHandle>>;

    /// The least busy operational hardware backend, if any.
    async fn least_busy(&self) -> ConnectorResult<Option<BackendHandle>> {
        let backends = self.backends().await?;
        Ok(pick_least_busy(&backends).cloned())
    }

    /// Persist the credentials in the service's local account store.
    async fn save_account(
        &self,
        credentials: &CredentialRecord,
        options: SaveOptions,
    ) -> ConnectorResult<()>;
}

/// Opens service sessions from a credential record.
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    /// Create a session. Implementations may defer authentication to the
    /// first request.
    async fn open(&self, credentials: &CredentialRecord) -> ConnectorResult<Box<dyn BackendService>>;
}
