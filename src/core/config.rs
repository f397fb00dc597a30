//! Configuration management for Vitals.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable overrides
//! - CLI argument overrides
//! - Validation and defaults

use crate::core::{Result, VitalsError};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Complete configuration for Vitals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Event store configuration
    pub store: StoreConfig,
    /// Sampling configuration
    pub sampling: SamplingConfig,
    /// Admin auth configuration
    pub auth: AuthConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP port for the beacon and summary endpoints
    pub port: u16,
    /// Bind address
    pub bind_address: IpAddr,
    /// Maximum raw events accepted per beacon request; the rest of an
    /// oversized batch is dropped silently
    pub max_batch_size: usize,
    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
}

/// Event store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of events held in memory (FIFO eviction beyond this)
    pub capacity: usize,
    /// Event retention window
    #[serde(with = "humantime_serde")]
    pub retention: Duration,
}

/// Sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Probability that a beacon request is accepted (0.0 to 1.0)
    pub rate: f64,
}

/// Admin auth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token required by the summary endpoint. When unset, the
    /// summary endpoint rejects every request.
    pub admin_token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Verbose structured output (targets, thread ids, line numbers)
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            sampling: SamplingConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            debug: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 4630,
            bind_address: "0.0.0.0".parse().expect("Valid default IP address"),
            max_batch_size: 100,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            capacity: 10_000,
            retention: Duration::from_secs(24 * 3600),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig { rate: 1.0 }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig { admin_token: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.max_batch_size == 0 {
            return Err(VitalsError::config("max_batch_size must be greater than 0"));
        }

        if self.server.max_body_bytes == 0 {
            return Err(VitalsError::config("max_body_bytes must be greater than 0"));
        }

        if self.store.capacity == 0 {
            return Err(VitalsError::config("store capacity must be greater than 0"));
        }

        if self.store.retention < Duration::from_secs(60) {
            return Err(VitalsError::config(format!(
                "retention must be at least 1 minute, got {:?}",
                self.store.retention
            )));
        }

        if self.sampling.rate < 0.0 || self.sampling.rate > 1.0 {
            return Err(VitalsError::InvalidSamplingRate(self.sampling.rate));
        }

        if let Some(token) = &self.auth.admin_token {
            if token.len() < 8 {
                return Err(VitalsError::config("admin_token must be at least 8 characters"));
            }
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| VitalsError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set HTTP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set bind address
    pub fn bind_address(mut self, addr: IpAddr) -> Self {
        self.config.server.bind_address = addr;
        self
    }

    /// Set store capacity
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.store.capacity = capacity;
        self
    }

    /// Set retention window
    pub fn retention(mut self, retention: Duration) -> Self {
        self.config.store.retention = retention;
        self
    }

    /// Set sampling rate
    pub fn sampling_rate(mut self, rate: f64) -> Self {
        self.config.sampling.rate = rate;
        self
    }

    /// Set admin token
    pub fn admin_token(mut self, token: Option<String>) -> Self {
        self.config.auth.admin_token = token;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 4630);
        assert_eq!(config.store.capacity, 10_000);
        assert_eq!(config.store.retention, Duration::from_secs(86_400));
        assert_eq!(config.sampling.rate, 1.0);
    }

    #[test]
    fn test_invalid_sampling_rate() {
        let result = ConfigBuilder::new().sampling_rate(1.5).build();
        assert!(matches!(result, Err(VitalsError::InvalidSamplingRate(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = ConfigBuilder::new().capacity(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_short_retention_rejected() {
        let result = ConfigBuilder::new().retention(Duration::from_secs(5)).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_short_admin_token_rejected() {
        let result = ConfigBuilder::new().admin_token(Some("abc".into())).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
server:
  port: 9090
store:
  capacity: 500
  retention: 1h
sampling:
  rate: 0.25
"#;
        let config = ConfigBuilder::new().from_yaml(yaml).unwrap().build().unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.store.capacity, 500);
        assert_eq!(config.store.retention, Duration::from_secs(3600));
        assert_eq!(config.sampling.rate, 0.25);
    }
}
