//! qconnect core
//!
//! Resolves the active service plan from environment switches, assembles its
//! credentials, and connects to the least busy backend through a
//! [`ServiceProvider`].
//!
//! # Overview
//!
//! ```text
//!   Environment ──→ resolve_plan() ──→ assemble_credentials() ──→ ServiceProvider::open()
//!                        │                                             │
//!                   plan label/key                          backends() / least_busy()
//! ```
//!
//! # Environment
//!
//! | Variable | Role |
//! |----------|------|
//! | `OPEN_PLAN`, `STANDARD_PLAN`, `PAYGO_PLAN`, `PREMIUM_PLAN`, `FLEX_PLAN`, `DEDICATED_PLAN` | Mutually exclusive plan switches |
//! | `<PREFIX>_PLAN_NAME` | Required once the switch is on |
//! | `<PREFIX>_PLAN_CHANNEL`, `<PREFIX>_PLAN_INSTANCE` | Connection parameters |
//! | `IQP_API_TOKEN` | API token |
//!
//! # Example
//!
//! ```ignore
//! use qconnect_core::{Environment, connect};
//! use qconnect_adapter_ibm::IbmProvider;
//!
//! let env = Environment::load()?;
//! let backend = connect(&env, &IbmProvider::new()).await?;
//! println!("{}", backend.summary());
//! ```

pub mod connector;
pub mod credentials;
pub mod env;
pub mod error;
pub mod plan;
pub mod service;

pub use connector::{SaveOutcome, connect, list_backends, resolve, save_account};
pub use credentials::{CREDENTIAL_KEYS, CredentialRecord, TOKEN_VAR, assemble_credentials};
pub use env::Environment;
pub use error::{ConnectorError, ConnectorResult};
pub use plan::{PLAN_SWITCHES, PlanSwitch, ResolvedPlan, Tier, plan_key, plan_label, resolve_plan};
pub use service::{
    BackendHandle, BackendService, BackendSummary, SaveOptions, ServiceProvider, pick_least_busy,
};
