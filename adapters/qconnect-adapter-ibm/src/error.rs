//! Error types for the IBM Quantum adapter.

use thiserror::Error;

use qconnect_core::ConnectorError;

/// Result type for IBM operations.
pub type IbmResult<T> = Result<T, IbmError>;

/// Errors that can occur when talking to IBM Quantum.
#[derive(Debug, Error)]
pub enum IbmError {
    /// Missing API token.
    #[error("IBM Quantum API token not found. Set IQP_API_TOKEN.")]
    MissingToken,

    /// Invalid API token.
    #[error("Invalid IBM Quantum API token")]
    InvalidToken,

    /// Cloud channels need an instance CRN.
    #[error("an instance CRN is required for the {0} channel (set <PLAN>_PLAN_INSTANCE)")]
    MissingInstance(String),

    /// Channel outside the supported vocabulary.
    #[error("Unknown channel '{0}'. Available: ibm_cloud, ibm_quantum_platform, ibm_quantum")]
    InvalidChannel(String),

    /// IAM token exchange failed.
    #[error("IAM token exchange failed: {0}")]
    IamTokenExchange(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Quantum API error: {message}")]
    ApiError {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Backend not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Reading or writing the account file failed.
    #[error("Account store error: {0}")]
    AccountStore(String),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<IbmError> for ConnectorError {
    fn from(e: IbmError) -> Self {
        match e {
            IbmError::InvalidChannel(_) => ConnectorError::Configuration(e.to_string()),
            _ => ConnectorError::Service(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_display() {
        assert!(IbmError::MissingToken.to_string().contains("IQP_API_TOKEN"));
    }

    #[test]
    fn test_missing_instance_display() {
        let err = IbmError::MissingInstance("ibm_cloud".into());
        assert!(err.to_string().contains("ibm_cloud"));
    }

    #[test]
    fn test_invalid_channel_display() {
        let err = IbmError::InvalidChannel("aws".into());
        let msg = err.to_string();
        assert!(msg.contains("'aws'"));
        assert!(msg.contains("ibm_quantum_platform"));
    }

    #[test]
    fn test_api_error_display() {
        let err = IbmError::ApiError {
            code: Some("ERR_401".into()),
            message: "Unauthorized".into(),
        };
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[test]
    fn test_backend_unavailable_display() {
        let err = IbmError::BackendUnavailable("ibm_brisbane".into());
        assert!(err.to_string().contains("ibm_brisbane"));
    }

    #[test]
    fn test_iam_token_exchange_display() {
        let err = IbmError::IamTokenExchange("401 Unauthorized".into());
        assert!(err.to_string().contains("401 Unauthorized"));
    }

    // -- ConnectorError conversion tests --

    #[test]
    fn test_invalid_channel_to_configuration() {
        let err: ConnectorError = IbmError::InvalidChannel("aws".into()).into();
        assert!(matches!(err, ConnectorError::Configuration(_)));
    }

    #[test]
    fn test_missing_token_to_service() {
        let err: ConnectorError = IbmError::MissingToken.into();
        assert!(matches!(err, ConnectorError::Service(msg) if msg.contains("IQP_API_TOKEN")));
    }

    #[test]
    fn test_api_error_to_service_keeps_message() {
        let err: ConnectorError = IbmError::ApiError {
            code: None,
            message: "server error".into(),
        }
        .into();
        assert!(matches!(err, ConnectorError::Service(msg) if msg.contains("server error")));
    }

    #[test]
    fn test_account_store_to_service() {
        let err: ConnectorError = IbmError::AccountStore("read-only".into()).into();
        assert!(matches!(err, ConnectorError::Service(_)));
    }
}
