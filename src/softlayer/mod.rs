//! SoftLayer (IBM Cloud classic infrastructure) REST client.
//!
//! The waiters only ever read status, so the client exposes a handful of
//! masked `GET` calls behind the [`ClassicApi`] trait. Tests substitute a
//! scripted implementation; production code uses [`SoftLayerClient`].

mod error;
mod types;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

pub use error::SoftLayerError;
pub use types::{Hardware, NetworkStorage};
use types::ApiErrorBody;

/// Default public REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.softlayer.com/rest/v3.1";

const HARDWARE_MASK: &str = "mask[id,hostname,domain,provisionDate,activeTransactionCount]";
const STORAGE_MASK: &str = "mask[id,activeTransactionCount,volumeStatus]";

/// Future returned by [`ClassicApi`] calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SoftLayerError>> + Send + 'a>>;

/// Read-only classic infrastructure calls used by the waiters.
pub trait ClassicApi {
    /// Fetches one hardware record by identifier.
    fn get_hardware(&self, id: u64) -> ApiFuture<'_, Hardware>;

    /// Lists account hardware matching a host name and domain.
    fn find_hardware<'a>(&'a self, hostname: &'a str, domain: &'a str)
    -> ApiFuture<'a, Vec<Hardware>>;

    /// Fetches one block or file storage volume by identifier.
    fn get_network_storage(&self, id: u64) -> ApiFuture<'_, NetworkStorage>;
}

/// API key credentials for the classic infrastructure API.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    /// Classic infrastructure user name.
    pub username: String,
    /// Classic infrastructure API key.
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// HTTP client for the SoftLayer REST API.
#[derive(Clone, Debug)]
pub struct SoftLayerClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
}

impl SoftLayerClient {
    /// Builds a client for `endpoint` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SoftLayerError::Config`] when the endpoint or credentials
    /// are empty, or when the HTTP client cannot be constructed.
    pub fn new(
        endpoint: &str,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self, SoftLayerError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(SoftLayerError::Config(String::from("endpoint is empty")));
        }
        if credentials.username.trim().is_empty() || credentials.api_key.trim().is_empty() {
            return Err(SoftLayerError::Config(String::from(
                "username and API key are required",
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| SoftLayerError::Config(err.to_string()))?;

        Ok(Self {
            http,
            endpoint: trimmed.to_owned(),
            credentials,
        })
    }

    /// Endpoint the client sends requests to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SoftLayerError> {
        let url = format!("{}/{path}", self.endpoint);
        debug!(%path, "softlayer request");
        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.api_key))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(SoftLayerError::Api {
                status: status.as_u16(),
                code: parsed.code.unwrap_or_default(),
                path: path.to_owned(),
                message: parsed.error.unwrap_or(body),
            });
        }

        serde_json::from_str(&body).map_err(|err| SoftLayerError::Decode {
            path: path.to_owned(),
            message: err.to_string(),
        })
    }
}

fn mask(value: &str) -> (&'static str, String) {
    ("objectMask", value.to_owned())
}

impl ClassicApi for SoftLayerClient {
    fn get_hardware(&self, id: u64) -> ApiFuture<'_, Hardware> {
        Box::pin(async move {
            let path = format!("SoftLayer_Hardware_Server/{id}/getObject.json");
            self.get_json(&path, &[mask(HARDWARE_MASK)]).await
        })
    }

    fn find_hardware<'a>(
        &'a self,
        hostname: &'a str,
        domain: &'a str,
    ) -> ApiFuture<'a, Vec<Hardware>> {
        Box::pin(async move {
            let filter = json!({
                "hardware": {
                    "hostname": { "operation": hostname },
                    "domain": { "operation": domain },
                }
            });
            self.get_json(
                "SoftLayer_Account/getHardware.json",
                &[mask(HARDWARE_MASK), ("objectFilter", filter.to_string())],
            )
            .await
        })
    }

    fn get_network_storage(&self, id: u64) -> ApiFuture<'_, NetworkStorage> {
        Box::pin(async move {
            let path = format!("SoftLayer_Network_Storage/{id}/getObject.json");
            self.get_json(&path, &[mask(STORAGE_MASK)]).await
        })
    }
}
