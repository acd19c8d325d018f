//! Service channels.

use std::fmt;
use std::str::FromStr;

use crate::error::IbmError;

/// How the adapter reaches IBM Quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    /// IBM Cloud (IAM API key + instance CRN).
    #[default]
    IbmCloud,
    /// IBM Quantum Platform on the new Cloud API (IAM API key + instance CRN).
    IbmQuantumPlatform,
    /// Legacy IBM Quantum endpoint (direct bearer token + hub/group/project).
    IbmQuantum,
}

impl Channel {
    /// Channel identifier as written in the environment and account file.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::IbmCloud => "ibm_cloud",
            Channel::IbmQuantumPlatform => "ibm_quantum_platform",
            Channel::IbmQuantum => "ibm_quantum",
        }
    }

    /// Whether this channel uses the IAM-authenticated Cloud API.
    pub fn is_cloud(self) -> bool {
        !matches!(self, Channel::IbmQuantum)
    }

    /// Parse a channel, treating an empty value as the default.
    pub fn parse_or_default(value: &str) -> Result<Self, IbmError> {
        if value.trim().is_empty() {
            Ok(Self::default())
        } else {
            value.parse()
        }
    }
}

impl FromStr for Channel {
    type Err = IbmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ibm_cloud" => Ok(Channel::IbmCloud),
            "ibm_quantum_platform" => Ok(Channel::IbmQuantumPlatform),
            "ibm_quantum" => Ok(Channel::IbmQuantum),
            other => Err(IbmError::InvalidChannel(other.to_string())),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
