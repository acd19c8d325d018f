//! qconnect adapter for IBM Quantum
//!
//! This crate implements [`qconnect_core::ServiceProvider`] and
//! [`qconnect_core::BackendService`] against the IBM Quantum Platform API
//! (Qiskit Runtime).
//!
//! # Channels
//!
//! | Channel | Authentication | `instance` |
//! |---------|----------------|------------|
//! | `ibm_cloud` (default) | IAM API key exchange | Service CRN |
//! | `ibm_quantum_platform` | IAM API key exchange | Service CRN |
//! | `ibm_quantum` | Direct bearer token (legacy) | hub/group/project |
//!
//! # Example
//!
//! ```ignore
//! use qconnect_adapter_ibm::IbmProvider;
//! use qconnect_core::{Environment, connect};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let env = Environment::load()?;
//!     let backend = connect(&env, &IbmProvider::new()).await?;
//!     println!("Least busy: {}", backend.summary());
//!     Ok(())
//! }
//! ```
//!
//! # Saved accounts
//!
//! `save_account` writes to `~/.qiskit/qiskit-ibm.json`, the file the Qiskit
//! Runtime client reads its default account from. Use
//! [`IbmProvider::with_account_file`] to point elsewhere.

mod account;
mod api;
mod channel;
mod error;
mod service;

pub use account::{AccountStore, SavedAccount};
pub use api::{
    BackendInfo, BackendStatus, DEFAULT_ENDPOINT, Endpoints, IAM_TOKEN_URL, IbmClient,
    LEGACY_ENDPOINT,
};
pub use channel::Channel;
pub use error::{IbmError, IbmResult};
pub use service::{IbmProvider, IbmRuntimeService};
