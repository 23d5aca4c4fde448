//! Shared API client session.
//!
//! One [`ClientSession`] is built per process from [`ProviderConfig`] and
//! passed by reference to every operation. Backend clients are created on
//! first use and shared read-only afterwards.

use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::config::{ConfigError, ProviderConfig};
use crate::softlayer::{SoftLayerClient, SoftLayerError};

/// Errors raised while building a session or one of its clients.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    /// Raised when the provider configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Raised when the SoftLayer client cannot be built.
    #[error("cannot create SoftLayer client: {0}")]
    SoftLayer(#[from] SoftLayerError),
}

/// Lazily initialised set of typed API clients.
#[derive(Clone, Debug)]
pub struct ClientSession {
    config: Arc<ProviderConfig>,
    softlayer: Arc<OnceLock<SoftLayerClient>>,
}

impl ClientSession {
    /// Validates `config` and creates a session with no clients built yet.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] when validation fails.
    pub fn new(config: ProviderConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            softlayer: Arc::new(OnceLock::new()),
        })
    }

    /// Configuration the session was built from.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns the SoftLayer client, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SoftLayer`] when the HTTP client cannot be
    /// constructed.
    pub fn softlayer(&self) -> Result<&SoftLayerClient, SessionError> {
        if let Some(client) = self.softlayer.get() {
            return Ok(client);
        }
        let client = SoftLayerClient::new(
            &self.config.endpoint_url,
            self.config.credentials(),
            self.config.request_timeout(),
        )?;
        Ok(self.softlayer.get_or_init(|| client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::softlayer::DEFAULT_ENDPOINT;

    fn config() -> ProviderConfig {
        ProviderConfig {
            username: String::from("user"),
            api_key: String::from("key"),
            endpoint_url: format!("{DEFAULT_ENDPOINT}/"),
            timeout_secs: 5,
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut invalid = config();
        invalid.api_key = String::new();
        let err = ClientSession::new(invalid).expect_err("blank key should fail");
        assert!(matches!(err, SessionError::Config(ConfigError::MissingField(_))));
    }

    #[test]
    fn softlayer_client_is_built_once_and_shared() {
        let session = ClientSession::new(config()).expect("valid config");
        let clone = session.clone();
        let first = session.softlayer().expect("client builds");
        let second = clone.softlayer().expect("client builds");
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.endpoint(), DEFAULT_ENDPOINT);
    }
}
