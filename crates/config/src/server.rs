//! Control server configuration
//!
//! Loaded from its own YAML file, camelCase keys. All fields default so an
//! absent file yields a working server on the default port.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Default control API port
pub const DEFAULT_SERVER_PORT: u16 = 4900;

/// Metrics registries the control server can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MetricsRegistry {
    Prometheus,
}

/// Control server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ServerConfig {
    /// Serve the control API over TLS
    ///
    /// Certificate material is consumed from the keystore fields; termination
    /// itself is delegated to the deployment's ingress.
    pub ssl: bool,

    /// Path to the keystore holding the server certificate
    pub key_store_file_path: String,

    /// Keystore password
    pub key_store_password: String,

    /// Private key password
    pub private_key_password: String,

    /// Control API listen port
    pub server_port: u16,

    /// Enabled metrics registries; `/metrics/*` routes 404 when empty
    pub metrics_registries: Vec<MetricsRegistry>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ssl: false,
            key_store_file_path: String::new(),
            key_store_password: String::new(),
            private_key_password: String::new(),
            server_port: DEFAULT_SERVER_PORT,
            metrics_registries: vec![MetricsRegistry::Prometheus],
        }
    }
}

impl ServerConfig {
    /// Load a server file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: ServerConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.ssl && self.key_store_file_path.is_empty() {
            return Err(ConfigError::invalid(
                "ssl is enabled but keyStoreFilePath is not set",
            ));
        }
        Ok(())
    }

    /// Whether the Prometheus registry is enabled
    pub fn prometheus_enabled(&self) -> bool {
        self.metrics_registries
            .contains(&MetricsRegistry::Prometheus)
    }
}

impl FromStr for ServerConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
