//! Configuration loading for serper-mcp
//!
//! Configuration is loaded from:
//! 1. An explicit path (`--config`) or environment variable SERPER_MCP_CONFIG_PATH
//! 2. ~/.config/serper-mcp/config.toml
//! 3. Default values
//!
//! Environment variables are applied on top of the file:
//! SERPER_API_KEY, SERPER_BASE_URL, MCP_TOKEN, MCP_AUTH_DISABLED, HOST, PORT.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener and session transport
    #[serde(default)]
    pub server: ServerConfig,
    /// Bearer token gate
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upstream Serper API
    #[serde(default)]
    pub serper: SerperConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path of the push-channel (SSE) endpoint
    #[serde(default = "default_sse_path")]
    pub sse_path: String,
    /// Path of the inbound message endpoint
    #[serde(default = "default_message_path")]
    pub message_path: String,
    /// Interval between SSE keep-alive comments
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u64,
    /// Buffered messages per session, in each direction
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require a bearer token on every route except `/_health`
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Shared secret compared by exact string equality
    #[serde(default)]
    pub token: Option<String>,
}

/// Serper API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerperConfig {
    /// API key sent as `X-API-KEY`
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on each upstream call
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// User agent for upstream requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_sse_path() -> String {
    "/sse".to_string()
}

fn default_message_path() -> String {
    "/sse-message".to_string()
}

fn default_keep_alive() -> u64 {
    30
}

fn default_channel_capacity() -> usize {
    32
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://google.serper.dev".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("serper-mcp/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            sse_path: default_sse_path(),
            message_path: default_message_path(),
            keep_alive_seconds: default_keep_alive(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            token: None,
        }
    }
}

impl Default for SerperConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServerConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SerperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply the environment
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let config_path = explicit_path
            .map(Path::to_path_buf)
            .or_else(Self::find_config_path);

        let mut config = match config_path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::info!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            None => {
                tracing::info!("No config path specified, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Apply environment-style overrides using `lookup` to read variables
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("SERPER_API_KEY") {
            self.serper.api_key = key;
        }
        if let Some(url) = lookup("SERPER_BASE_URL") {
            self.serper.base_url = url;
        }
        if let Some(token) = lookup("MCP_TOKEN").filter(|t| !t.is_empty()) {
            self.auth.token = Some(token);
        }
        if let Some(disabled) = lookup("MCP_AUTH_DISABLED") {
            if parse_flag(&disabled) {
                self.auth.enabled = false;
            }
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Fail-fast checks run before the server starts
    pub fn validate(&self) -> Result<()> {
        if self.serper.api_key.trim().is_empty() {
            bail!("SERPER_API_KEY is not set (environment or [serper].api_key)");
        }
        url::Url::parse(&self.serper.base_url)
            .map_err(|e| anyhow!("invalid serper base_url '{}': {}", self.serper.base_url, e))?;
        if self.auth.enabled && self.auth.token.as_deref().map_or(true, str::is_empty) {
            bail!("authentication is enabled but no token is configured (set MCP_TOKEN or MCP_AUTH_DISABLED=true)");
        }
        for path in [&self.server.sse_path, &self.server.message_path] {
            if !path.starts_with('/') {
                bail!("endpoint path '{}' must start with '/'", path);
            }
        }
        if self.server.sse_path == self.server.message_path {
            bail!("sse_path and message_path must differ");
        }
        if self.server.channel_capacity == 0 {
            bail!("channel_capacity must be at least 1");
        }
        Ok(())
    }

    /// Find the configuration file path
    fn find_config_path() -> Option<PathBuf> {
        // 1. Check environment variable
        if let Ok(path) = std::env::var("SERPER_MCP_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        // 2. Check ~/.config/serper-mcp/config.toml
        dirs::config_dir().map(|dir| dir.join("serper-mcp").join("config.toml"))
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "t" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn valid() -> Config {
        let mut config = Config::default();
        config.serper.api_key = "key".to_string();
        config.auth.token = Some("secret".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.sse_path, "/sse");
        assert_eq!(config.server.message_path, "/sse-message");
        assert_eq!(config.serper.base_url, "https://google.serper.dev");
        assert!(config.auth.enabled);
    }

    #[test]
    fn test_from_file_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 8080\n\n[serper]\napi_key = \"abc\"\ntimeout_seconds = 5"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.serper.api_key, "abc");
        assert_eq!(config.serper.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SERPER_API_KEY", "from-env"),
            ("MCP_TOKEN", "tok"),
            ("MCP_AUTH_DISABLED", "true"),
            ("PORT", "9000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.serper.api_key, "from-env");
        assert_eq!(config.auth.token.as_deref(), Some("tok"));
        assert!(!config.auth.enabled);
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let mut config = valid();
        config.serper.api_key = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }

    #[test]
    fn test_validate_requires_token_when_auth_enabled() {
        let mut config = valid();
        config.auth.token = None;
        assert!(config.validate().is_err());

        config.auth.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_paths() {
        let mut config = valid();
        config.server.message_path = "/sse".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.server.sse_path = "sse".to_string();
        assert!(config.validate().is_err());
    }
}
