//! Credential assembly for a resolved plan.

use std::collections::BTreeMap;
use std::fmt;

use crate::env::Environment;
use crate::error::{ConnectorError, ConnectorResult};
use crate::plan::switch_for_key;

/// Variable holding the service API token, shared by every plan.
pub const TOKEN_VAR: &str = "IQP_API_TOKEN";

/// The four credential keys, in a fixed order.
pub const CREDENTIAL_KEYS: [&str; 4] = ["name", "channel", "instance", "token"];

/// Credentials for one service account.
///
/// Missing values are empty strings; see [`CredentialRecord::missing_fields`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Account name.
    pub name: String,
    /// Service channel (e.g. "ibm_cloud").
    pub channel: String,
    /// Instance CRN or hub/group/project path.
    pub instance: String,
    /// API token.
    pub token: String,
}

impl CredentialRecord {
    /// Create a record from explicit values.
    pub fn new(
        name: impl Into<String>,
        channel: impl Into<String>,
        instance: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            channel: channel.into(),
            instance: instance.into(),
            token: token.into(),
        }
    }

    /// Keys whose values are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        CREDENTIAL_KEYS
            .into_iter()
            .zip([&self.name, &self.channel, &self.instance, &self.token])
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| k)
            .collect()
    }

    /// Whether every field has a value.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Mapping with exactly the keys `name`, `channel`, `instance` and `token`.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        CREDENTIAL_KEYS
            .into_iter()
            .zip([
                self.name.clone(),
                self.channel.clone(),
                self.instance.clone(),
                self.token.clone(),
            ])
            .collect()
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("name", &self.name)
            .field("channel", &self.channel)
            .field("instance", &self.instance)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Read the credentials for the plan identified by `key`.
///
/// Only an unknown key is an error. Missing companion variables are logged
/// as warnings and come back as empty fields.
pub fn assemble_credentials(env: &Environment, key: &str) -> ConnectorResult<CredentialRecord> {
    let switch = switch_for_key(key).ok_or_else(|| {
        ConnectorError::Configuration(format!("Unknown plan key: '{}'", key.trim()))
    })?;

    let read = |var: &str| -> String {
        match env.get_non_empty(var) {
            Some(v) => v.to_string(),
            None => {
                tracing::warn!("{var} is not set; credentials for {} are incomplete", switch.label);
                String::new()
            }
        }
    };

    Ok(CredentialRecord {
        name: read(&switch.name_var()),
        channel: read(&switch.channel_var()),
        instance: read(&switch.instance_var()),
        token: read(TOKEN_VAR),
    })
}
