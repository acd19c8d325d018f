//! Shared helpers for CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use qconnect_adapter_ibm::IbmProvider;
use qconnect_core::Environment;

/// Load the environment, optionally layering an explicit env file under it.
pub fn load_environment(env_file: Option<&Path>) -> Result<Environment> {
    match env_file {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Env file not found: {}", path.display());
            }
            Environment::load_from(path)
                .with_context(|| format!("Failed to read env file: {}", path.display()))
        }
        None => Ok(Environment::load()?),
    }
}

/// Provider for the IBM Quantum service, optionally with a custom account file.
pub fn create_provider(account_file: Option<PathBuf>) -> IbmProvider {
    match account_file {
        Some(path) => IbmProvider::new().with_account_file(path),
        None => IbmProvider::new(),
    }
}
