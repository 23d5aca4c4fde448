//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::softlayer::{Credentials, DEFAULT_ENDPOINT};

/// Classic infrastructure settings derived from environment variables and
/// configuration files.
#[derive(Clone, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "IAAS_CLASSIC",
    discovery(
        app_name = "provision-wait",
        env_var = "PROVISION_WAIT_CONFIG_PATH",
        config_file_name = "provision-wait.toml",
        dotfile_name = ".provision-wait.toml",
        project_file_name = "provision-wait.toml"
    )
)]
pub struct ProviderConfig {
    /// Classic infrastructure user name. Required.
    pub username: String,
    /// Classic infrastructure API key. Required.
    pub api_key: String,
    /// REST endpoint, overridable for private network access.
    #[ortho_config(default = DEFAULT_ENDPOINT.to_owned())]
    pub endpoint_url: String,
    /// Timeout applied to each HTTP request, in seconds.
    #[ortho_config(default = 60)]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl ProviderConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to provision-wait.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("provision-wait")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and configuration key that supply the missing value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::InvalidValue`] when the request timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.username,
            &FieldMetadata::new(
                "classic infrastructure user name",
                "IAAS_CLASSIC_USERNAME",
                "username",
            ),
        )?;
        Self::require_field(
            &self.api_key,
            &FieldMetadata::new(
                "classic infrastructure API key",
                "IAAS_CLASSIC_API_KEY",
                "api_key",
            ),
        )?;
        Self::require_field(
            &self.endpoint_url,
            &FieldMetadata::new(
                "classic infrastructure endpoint",
                "IAAS_CLASSIC_ENDPOINT_URL",
                "endpoint_url",
            ),
        )?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(String::from(
                "IAAS_CLASSIC_TIMEOUT_SECS must be greater than zero",
            )));
        }
        Ok(())
    }

    /// Credentials for the SoftLayer client, trimmed.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.trim().to_owned(),
            api_key: self.api_key.trim().to_owned(),
        }
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds an unusable value.
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}
