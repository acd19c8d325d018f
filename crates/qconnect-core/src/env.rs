//! Environment snapshot.
//!
//! All plan and credential lookups read from an [`Environment`] captured once
//! at process start, rather than from `std::env` at each call site.
//!
//! Loading precedence (highest to lowest):
//! 1. Process environment variables
//! 2. `.env` file (current directory or its parents, or an explicit path)

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use crate::error::{ConnectorError, ConnectorResult};

/// Immutable view of the configuration variables.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the process environment, with `.env` entries as defaults.
    ///
    /// A missing `.env` file is not an error; a malformed one is.
    pub fn load() -> ConnectorResult<Self> {
        let dotenv = match dotenvy::dotenv_iter() {
            Ok(iter) => Some(iter),
            Err(e) if e.not_found() => None,
            Err(e) => return Err(ConnectorError::Configuration(format!(".env: {e}"))),
        };

        let mut env = Self::default();
        if let Some(iter) = dotenv {
            for item in iter {
                let (key, value) =
                    item.map_err(|e| ConnectorError::Configuration(format!(".env: {e}")))?;
                env.vars.insert(key, value);
            }
            tracing::debug!("loaded {} entries from .env", env.vars.len());
        }
        env.overlay(std::env::vars_os());
        Ok(env)
    }

    /// Capture the process environment, with entries from `path` as defaults.
    pub fn load_from(path: impl AsRef<Path>) -> ConnectorResult<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            ConnectorError::Configuration(format!("{}: {e}", path.display()))
        })?;

        let mut env = Self::default();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                ConnectorError::Configuration(format!("{}: {e}", path.display()))
            })?;
            env.vars.insert(key, value);
        }
        env.overlay(std::env::vars_os());
        Ok(env)
    }

    /// Layer process variables over the current entries.
    ///
    /// Entries that are not valid UTF-8 cannot name a plan variable and are skipped.
    fn overlay(&mut self, vars: impl IntoIterator<Item = (OsString, OsString)>) {
        for (key, value) in vars {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    self.vars.insert(key, value);
                }
                (key, _) => {
                    tracing::debug!("skipping non UTF-8 environment entry {key:?}");
                }
            }
        }
    }

    /// Build a snapshot from explicit pairs. No process state is read.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a variable, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Raw value of a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of a variable with surrounding whitespace removed; empty counts as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Whether a variable holds a truthy switch value (`on`, `true`, `1`, `yes`).
    pub fn is_enabled(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }
}

/// Truthiness rule for plan switches.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}
