//! Connector operations: connect, list backends, save account.

use crate::credentials::{CredentialRecord, assemble_credentials};
use crate::env::Environment;
use crate::error::{ConnectorError, ConnectorResult};
use crate::plan::{ResolvedPlan, resolve_plan};
use crate::service::{BackendHandle, BackendService, SaveOptions, ServiceProvider};

/// Resolve the plan and its credentials in one step.
pub fn resolve(env: &Environment) -> ConnectorResult<(ResolvedPlan, CredentialRecord)> {
    let plan = resolve_plan(env)?;
    let credentials = assemble_credentials(env, plan.key())?;
    Ok((plan, credentials))
}

async fn open_session(
    env: &Environment,
    provider: &dyn ServiceProvider,
) -> ConnectorResult<(ResolvedPlan, Box<dyn BackendService>)> {
    let (plan, credentials) = resolve(env)?;
    tracing::info!(
        plan = plan.key(),
        channel = credentials.channel.as_str(),
        "opening service session for {plan}"
    );
    let service = provider.open(&credentials).await?;
    Ok((plan, service))
}

/// Connect to the least busy backend available to the active plan.
///
/// Fails with [`ConnectorError::NoBackendAvailable`] when the service lists
/// no backends or reports no least-busy candidate. The returned handle is
/// the one the service reported, unchanged.
pub async fn connect(
    env: &Environment,
    provider: &dyn ServiceProvider,
) -> ConnectorResult<BackendHandle> {
    let (plan, service) = open_session(env, provider).await?;

    let backends = service.backends().await?;
    if backends.is_empty() {
        return Err(ConnectorError::NoBackendAvailable {
            plan: plan.label().to_string(),
        });
    }
    for backend in &backends {
        tracing::info!("available QPU: {}", backend.summary());
    }

    let backend = service
        .least_busy()
        .await?
        .ok_or_else(|| ConnectorError::NoBackendAvailable {
            plan: plan.label().to_string(),
        })?;

    tracing::info!("connected to {} on the {}", backend.name, plan.label());
    Ok(backend)
}

/// List every backend visible under the active plan's credentials.
///
/// An empty list is a valid result.
pub async fn list_backends(
    env: &Environment,
    provider: &dyn ServiceProvider,
) -> ConnectorResult<Vec<BackendHandle>> {
    let (plan, service) = open_session(env, provider).await?;
    let backends = service.backends().await?;

    if backends.is_empty() {
        tracing::info!("no backends visible on the {}", plan.label());
    }
    for backend in &backends {
        tracing::info!("{}", backend.summary());
    }
    Ok(backends)
}

/// Outcome of [`save_account`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The account was written to the service's store.
    Saved {
        /// Account name.
        name: String,
    },
    /// Nothing was written because credential fields were empty.
    Skipped {
        /// Empty fields.
        missing: Vec<&'static str>,
    },
}

/// Persist the active plan's credentials as the default account.
///
/// Incomplete credentials are skipped with a warning rather than failing.
/// Repeated calls overwrite the same entry.
pub async fn save_account(
    env: &Environment,
    provider: &dyn ServiceProvider,
) -> ConnectorResult<SaveOutcome> {
    let (plan, credentials) = resolve(env)?;

    let missing = credentials.missing_fields();
    if !missing.is_empty() {
        tracing::warn!(
            "not saving account for the {}: missing {}",
            plan.label(),
            missing.join(", ")
        );
        return Ok(SaveOutcome::Skipped { missing });
    }

    let service = provider.open(&credentials).await?;
    service
        .save_account(&credentials, SaveOptions::default())
        .await?;

    tracing::info!("saved account '{}' as default", credentials.name);
    Ok(SaveOutcome::Saved {
        name: credentials.name,
    })
}
