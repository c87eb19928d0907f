//! Client configuration.
//!
//! Configuration is read from TOML; every key is optional and falls back to
//! a local single-node default. Environment variables override the file:
//!
//! | Variable | Key |
//! |----------|-----|
//! | `QUARRY_ENDPOINT` | `endpoint` |
//! | `QUARRY_USERNAME` | `username` |
//! | `QUARRY_PASSWORD` | `password` |

use std::path::Path;

use quarry_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ClientConfig::endpoint`].
pub const ENV_ENDPOINT: &str = "QUARRY_ENDPOINT";
/// Environment variable overriding [`ClientConfig::username`].
pub const ENV_USERNAME: &str = "QUARRY_USERNAME";
/// Environment variable overriding [`ClientConfig::password`].
pub const ENV_PASSWORD: &str = "QUARRY_PASSWORD";

/// Connection settings for [`HttpSearchClient`](crate::HttpSearchClient).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the search service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HTTP basic-auth user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// HTTP basic-auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_endpoint() -> String {
    "http://localhost:8094".to_string()
}

fn default_timeout_secs() -> u64 {
    75
}

fn default_user_agent() -> String {
    concat!("quarry/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Override settings from the `QUARRY_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override settings from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = Some(password);
        }
    }

    /// Builder-style credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Check the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty or non-HTTP endpoint, a zero
    /// timeout, or a password without a username.
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::config("endpoint must not be empty"));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::config(format!(
                "endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(Error::config("password set without a username"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
