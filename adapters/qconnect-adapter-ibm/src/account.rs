//! Local account store.
//!
//! Accounts are kept in a JSON object keyed by account name, in the same
//! place and shape the Qiskit Runtime client uses:
//!
//! ```json
//! {
//!   "test-open": {
//!     "channel": "ibm_cloud",
//!     "token": "...",
//!     "instance": "crn:v1:...",
//!     "is_default_account": true
//!   }
//! }
//! ```
//!
//! Saving upserts a single entry. Fields this crate does not model are
//! written back unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use qconnect_core::{CredentialRecord, SaveOptions};

use crate::channel::Channel;
use crate::error::{IbmError, IbmResult};

/// One saved account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAccount {
    /// Channel identifier.
    pub channel: String,
    /// API token.
    pub token: String,
    /// Instance CRN or hub/group/project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Whether this is the default account.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default_account: bool,
    /// Settings written by other clients (`url`, `proxies`, `verify`, ...), kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl std::fmt::Debug for SavedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedAccount")
            .field("channel", &self.channel)
            .field("token", &"[REDACTED]")
            .field("instance", &self.instance)
            .field("is_default_account", &self.is_default_account)
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// JSON file holding named accounts.
///
/// Without a home directory the default store has no location; reads and
/// writes then fail instead of falling back to the working directory.
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: Option<PathBuf>,
}

impl AccountStore {
    /// `~/.qiskit/qiskit-ibm.json`, if the home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qiskit").join("qiskit-ibm.json"))
    }

    /// Store at the default location.
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// File backing this store.
    pub fn path(&self) -> IbmResult<&Path> {
        self.path.as_deref().ok_or_else(|| {
            IbmError::AccountStore(
                "home directory not found; set QCONNECT_ACCOUNT_FILE to choose an account file"
                    .into(),
            )
        })
    }

    /// Read all accounts. A missing file is an empty store.
    pub fn load(&self) -> IbmResult<BTreeMap<String, SavedAccount>> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            IbmError::AccountStore(format!("failed to read {}: {e}", path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// The default account, if one is marked.
    pub fn load_default(&self) -> IbmResult<Option<(String, SavedAccount)>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|(_, account)| account.is_default_account))
    }

    /// Save `credentials` and return the entry name.
    ///
    /// The entry is named after the credential record, or `default-<channel>`
    /// when the record has no name.
    pub fn save(&self, credentials: &CredentialRecord, options: SaveOptions) -> IbmResult<String> {
        let channel = Channel::parse_or_default(&credentials.channel)?;
        let name = if credentials.name.trim().is_empty() {
            format!("default-{channel}")
        } else {
            credentials.name.trim().to_string()
        };

        let mut accounts = self.load()?;
        if accounts.contains_key(&name) && !options.overwrite {
            return Err(IbmError::AccountStore(format!(
                "account '{name}' already exists; enable overwrite to replace it"
            )));
        }

        if options.set_as_default {
            for account in accounts.values_mut() {
                account.is_default_account = false;
            }
        }

        // Settings other clients stored on this entry survive the upsert
        let extra = accounts
            .remove(&name)
            .map(|previous| previous.extra)
            .unwrap_or_default();
        let instance = credentials.instance.trim();
        accounts.insert(
            name.clone(),
            SavedAccount {
                channel: channel.as_str().to_string(),
                token: credentials.token.clone(),
                instance: (!instance.is_empty()).then(|| instance.to_string()),
                is_default_account: options.set_as_default,
                extra,
            },
        );

        let path = self.path()?;
        Self::write(path, &accounts)?;
        tracing::debug!("saved account '{name}' to {}", path.display());
        Ok(name)
    }

    fn write(path: &Path, accounts: &BTreeMap<String, SavedAccount>) -> IbmResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                IbmError::AccountStore(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(accounts)?;
        std::fs::write(path, json).map_err(|e| {
            IbmError::AccountStore(format!("failed to write {}: {e}", path.display()))
        })?;

        // Tokens are secrets
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| IbmError::AccountStore(format!("failed to set permissions: {e}")))?;
        }

        Ok(())
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}
