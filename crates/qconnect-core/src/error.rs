//! Error types for the connector crate.

use thiserror::Error;

/// Errors that can occur while resolving a plan or connecting to a service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectorError {
    /// Plan switches or their companion variables are misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service reported no usable backend.
    #[error("No QPU available for the {plan}")]
    NoBackendAvailable {
        /// Display label of the resolved plan.
        plan: String,
    },

    /// Failure reported by the compute service (network, auth, API).
    #[error("Service error: {0}")]
    Service(String),
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = ConnectorError::Configuration("OPEN_PLAN_NAME must be set".into());
        assert!(err.to_string().contains("OPEN_PLAN_NAME"));
    }

    #[test]
    fn test_no_backend_display() {
        let err = ConnectorError::NoBackendAvailable {
            plan: "Open Plan".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("No QPU available"));
        assert!(msg.contains("Open Plan"));
    }

    #[test]
    fn test_service_display() {
        let err = ConnectorError::Service("401 Unauthorized".into());
        assert!(err.to_string().contains("401 Unauthorized"));
    }
}
