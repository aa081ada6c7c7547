//! Configuration module
//!
//! Handles loading and validating client configuration from TOML files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chat::identity::SessionIdentity;
use crate::connection::endpoints::{EndpointList, DEFAULT_ENDPOINTS};
use crate::connection::protocol::ParseMode;
use crate::connection::retry::{RetryPolicy, DEFAULT_JITTER};
use crate::connection::websocket::ConnectionManagerBuilder;

/// Main configuration structure for the chat client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Display name; a random guest name is used when unset
    #[serde(default)]
    pub identity: Option<String>,

    /// Chat servers to rotate through
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Reconnect behaviour
    #[serde(default)]
    pub retry: RetryConfig,

    /// Socket settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Frame decoding
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// WebSocket URLs, tried in order
    #[serde(default = "default_endpoint_urls")]
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay after the first failed attempt
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Upper bound on any delay
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Backoff growth factor
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,

    /// Random spread applied to each delay, as a fraction of it
    #[serde(default = "default_jitter")]
    pub jitter: f32,

    /// Consecutive failed attempts before giving up (0 = infinite)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Per-attempt connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Capacity of the event and outbound queues
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// `lenient` drops undecodable frames, `strict` reports them
    #[serde(default)]
    pub mode: ParseMode,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

// Default value functions
fn default_endpoint_urls() -> Vec<String> {
    DEFAULT_ENDPOINTS.iter().map(|u| u.to_string()).collect()
}

fn default_initial_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_multiplier() -> u32 {
    2
}

fn default_jitter() -> f32 {
    DEFAULT_JITTER
}

fn default_max_attempts() -> u32 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_event_buffer() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            urls: default_endpoint_urls(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
            jitter: self.jitter,
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `path` if given, else the default location if it exists, else
    /// built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default_config()),
        }
    }

    /// `~/.chatwire/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".chatwire").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            identity: None,
            endpoints: EndpointsConfig::default(),
            retry: RetryConfig::default(),
            connection: ConnectionConfig::default(),
            protocol: ProtocolConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoint_list()?;

        if self.retry.multiplier < 1 {
            bail!("retry.multiplier must be at least 1");
        }
        if !(0.01..=1.0).contains(&self.retry.jitter) {
            bail!("retry.jitter must be between 0.01 and 1.0");
        }
        if self.connection.connect_timeout_secs == 0 {
            bail!("connection.connect_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    pub fn endpoint_list(&self) -> Result<EndpointList> {
        EndpointList::new(self.endpoints.urls.iter().cloned())
    }

    /// Configured identity, or a fresh guest name
    pub fn session_identity(&self) -> SessionIdentity {
        match &self.identity {
            Some(name) if !name.is_empty() => SessionIdentity::new(name.clone()),
            _ => SessionIdentity::guest(),
        }
    }

    /// A connection manager builder carrying every setting from this config
    pub fn manager_builder(&self, identity: SessionIdentity) -> Result<ConnectionManagerBuilder> {
        Ok(ConnectionManagerBuilder::new(identity)
            .endpoints(self.endpoint_list()?)
            .retry_policy(self.retry.policy())
            .connect_timeout(Duration::from_secs(self.connection.connect_timeout_secs))
            .parse_mode(self.protocol.mode)
            .event_buffer(self.connection.event_buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert!(config.identity.is_none());
        assert_eq!(config.endpoints.urls.len(), 3);
        assert_eq!(config.endpoints.urls[0], "ws://localhost:8090");
        assert_eq!(config.protocol.mode, ParseMode::Lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml_content = r#"
            identity = "alice"
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.identity.as_deref(), Some("alice"));
        assert_eq!(config.endpoints.urls[2], "ws://D3nexus.de:8090");
        assert_eq!(config.retry.max_attempts, 30);
        assert_eq!(config.session_identity().get(), "alice");
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
            [endpoints]
            urls = ["wss://chat.example:443"]

            [retry]
            initial_delay_ms = 100
            max_delay_ms = 1000
            multiplier = 3
            jitter = 0.1
            max_attempts = 0

            [connection]
            connect_timeout_secs = 3

            [protocol]
            mode = "strict"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.protocol.mode, ParseMode::Strict);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.connection.event_buffer, 256);

        let policy = config.retry.policy();
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
        assert_eq!(policy.multiplier, 3);
        assert_eq!(policy.jitter, 0.1);
        assert_eq!(policy.max_attempts, None);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = Config::default_config();
        config.endpoints.urls.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.endpoints.urls = vec!["http://localhost:8090".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.retry.multiplier = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.retry.jitter = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.endpoints.urls = vec!["ws://".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.connection.connect_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_identity_falls_back_to_guest() {
        let mut config = Config::default_config();
        config.identity = Some(String::new());
        assert!(config.session_identity().get().starts_with("GUEST_"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("chatwire-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let mut config = Config::default_config();
        config.identity = Some("bob".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.identity.as_deref(), Some("bob"));
        assert_eq!(loaded.endpoints.urls, config.endpoints.urls);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
