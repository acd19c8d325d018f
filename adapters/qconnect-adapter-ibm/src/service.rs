//! IBM Quantum Runtime implementation of the service traits.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};

use qconnect_core::{
    BackendHandle, BackendService, ConnectorResult, CredentialRecord, SaveOptions,
    ServiceProvider, pick_least_busy,
};

use crate::account::AccountStore;
use crate::api::{Endpoints, IbmClient};
use crate::channel::Channel;
use crate::error::{IbmError, IbmResult};

/// Opens [`IbmRuntimeService`] sessions.
#[derive(Debug, Clone, Default)]
pub struct IbmProvider {
    endpoints: Endpoints,
    account_file: Option<PathBuf>,
}

impl IbmProvider {
    /// Provider using the public IBM endpoints and the default account file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the API endpoints.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Override the account file location.
    pub fn with_account_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.account_file = Some(path.into());
        self
    }

    fn store(&self) -> AccountStore {
        self.account_file
            .as_ref()
            .map_or_else(AccountStore::new, |path| AccountStore::at(path.clone()))
    }
}

#[async_trait]
impl ServiceProvider for IbmProvider {
    async fn open(
        &self,
        credentials: &CredentialRecord,
    ) -> ConnectorResult<Box<dyn BackendService>> {
        let service = IbmRuntimeService::new(credentials.clone(), self.endpoints.clone())?
            .with_store(self.store());
        Ok(Box::new(service))
    }
}

/// A session against IBM Quantum.
///
/// Construction performs no I/O; the client authenticates on first use.
/// `least_busy` picks from the listing of the preceding `backends` call when
/// there is one, so a connect lists the devices only once.
#[derive(Debug)]
pub struct IbmRuntimeService {
    credentials: CredentialRecord,
    channel: Channel,
    endpoints: Endpoints,
    store: AccountStore,
    client: OnceCell<IbmClient>,
    last_listing: Mutex<Option<Vec<BackendHandle>>>,
}

impl IbmRuntimeService {
    /// Create a session for `credentials`. Fails only on an unknown channel.
    pub fn new(credentials: CredentialRecord, endpoints: Endpoints) -> IbmResult<Self> {
        let channel = Channel::parse_or_default(&credentials.channel)?;
        Ok(Self {
            credentials,
            channel,
            endpoints,
            store: AccountStore::new(),
            client: OnceCell::new(),
            last_listing: Mutex::new(None),
        })
    }

    /// Use a specific account store.
    pub fn with_store(mut self, store: AccountStore) -> Self {
        self.store = store;
        self
    }

    /// The channel this session uses.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    async fn client(&self) -> IbmResult<&IbmClient> {
        self.client
            .get_or_try_init(|| async {
                let token = self.credentials.token.trim();
                if token.is_empty() {
                    return Err(IbmError::MissingToken);
                }
                let instance = self.credentials.instance.trim();

                if self.channel.is_cloud() {
                    if instance.is_empty() {
                        return Err(IbmError::MissingInstance(self.channel.to_string()));
                    }
                    tracing::info!("connecting to IBM Cloud API ({})", self.channel);
                    IbmClient::connect(&self.endpoints, token, instance).await
                } else {
                    tracing::info!("connecting to legacy IBM Quantum endpoint");
                    Ok(IbmClient::new(self.endpoints.legacy.as_str(), token)?
                        .with_instance(instance))
                }
            })
            .await
    }
}

#[async_trait]
impl BackendService for IbmRuntimeService {
    async fn backends(&self) -> ConnectorResult<Vec<BackendHandle>> {
        let client = self.client().await?;
        let backends: Vec<BackendHandle> = client
            .list_backends()
            .await?
            .into_iter()
            .map(BackendHandle::from)
            .collect();
        *self.last_listing.lock().await = Some(backends.clone());
        Ok(backends)
    }

    async fn least_busy(&self) -> ConnectorResult<Option<BackendHandle>> {
        let cached = self.last_listing.lock().await.take();
        let backends = match cached {
            Some(backends) => backends,
            None => {
                let backends = self.backends().await?;
                self.last_listing.lock().await.take();
                backends
            }
        };
        Ok(pick_least_busy(&backends).cloned())
    }

    async fn save_account(
        &self,
        credentials: &CredentialRecord,
        options: SaveOptions,
    ) -> ConnectorResult<()> {
        self.store.save(credentials, options)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_unknown_channel() {
        let creds = CredentialRecord::new("n", "braket", "", "tok");
        assert!(matches!(
            IbmRuntimeService::new(creds, Endpoints::default()),
            Err(IbmError::InvalidChannel(_))
        ));
    }

    #[test]
    fn test_new_defaults_channel() {
        let creds = CredentialRecord::new("n", "", "crn", "tok");
        let service = IbmRuntimeService::new(creds, Endpoints::default()).unwrap();
        assert_eq!(service.channel(), Channel::IbmCloud);
    }

    #[tokio::test]
    async fn test_missing_token_fails_on_first_request() {
        let creds = CredentialRecord::new("n", "ibm_cloud", "crn", "");
        let service = IbmRuntimeService::new(creds, Endpoints::default()).unwrap();
        let err = service.backends().await.unwrap_err();
        assert!(err.to_string().contains("IQP_API_TOKEN"));
    }

    #[tokio::test]
    async fn test_cloud_channel_requires_instance() {
        let creds = CredentialRecord::new("n", "ibm_quantum_platform", "", "tok");
        let service = IbmRuntimeService::new(creds, Endpoints::default()).unwrap();
        let err = service.backends().await.unwrap_err();
        assert!(err.to_string().contains("instance CRN"));
    }

    #[tokio::test]
    async fn test_provider_save_account_writes_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let provider = IbmProvider::new().with_account_file(&path);

        let creds = CredentialRecord::new("test-open", "ibm_cloud", "crn:v1", "tok");
        let service = provider.open(&creds).await.unwrap();
        service
            .save_account(&creds, SaveOptions::default())
            .await
            .unwrap();

        let (name, account) = AccountStore::at(&path).load_default().unwrap().unwrap();
        assert_eq!(name, "test-open");
        assert_eq!(account.instance.as_deref(), Some("crn:v1"));
    }
}
