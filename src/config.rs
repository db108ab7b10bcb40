//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.balloonwatch.toml` files.

use crate::cli::{Args, Command};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".balloonwatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Telemetry feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// LLM settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Analysis cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of hourly snapshots fetched concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    6
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the dashboard page and its assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

/// Telemetry feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL; snapshots live at `<base_url>NN.json`.
    #[serde(default = "default_feed_url")]
    pub base_url: String,

    /// Number of hourly snapshots published (current + history).
    #[serde(default = "default_hours_available")]
    pub hours_available: u8,

    /// Request timeout in seconds.
    #[serde(default = "default_feed_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_url(),
            hours_available: default_hours_available(),
            timeout_seconds: default_feed_timeout(),
        }
    }
}

fn default_feed_url() -> String {
    "https://a.windbornesystems.com/treasure/".to_string()
}

fn default_hours_available() -> u8 {
    24
}

fn default_feed_timeout() -> u64 {
    30
}

/// LLM completion API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_llm_url")]
    pub api_url: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature for generation.
    #[serde(default)]
    pub temperature: f32,

    /// Maximum tokens in response.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_url(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: None,
            timeout_seconds: default_llm_timeout(),
        }
    }
}

fn default_llm_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

/// Analysis cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age of a cached analysis, in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_seconds: default_max_age(),
        }
    }
}

fn default_max_age() -> u64 {
    300
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.balloonwatch.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref url) = args.feed_url {
            self.feed.base_url = url.clone();
        }
        if let Some(ref url) = args.llm_url {
            self.llm.api_url = url.clone();
        }
        if let Some(ref model) = args.model {
            self.llm.model = model.clone();
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }
        if let Some(timeout) = args.timeout {
            self.feed.timeout_seconds = timeout;
            self.llm.timeout_seconds = timeout;
        }

        if let Some(Command::Serve { host, port }) = &args.command {
            if let Some(host) = host {
                self.server.host = host.clone();
            }
            if let Some(port) = port {
                self.server.port = *port;
            }
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> Args {
        Args {
            command: None,
            config: None,
            verbose: false,
            quiet: false,
            feed_url: None,
            llm_url: None,
            model: None,
            concurrency: None,
            timeout: None,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.base_url, "https://a.windbornesystems.com/treasure/");
        assert_eq!(config.feed.hours_available, 24);
        assert_eq!(config.cache.max_age_seconds, 300);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.temperature, 0.0);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true
concurrency = 2

[server]
port = 8080

[llm]
model = "gpt-4o"
max_tokens = 512

[cache]
max_age_seconds = 60
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.general.concurrency, 2);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, Some(512));
        assert_eq!(config.cache.max_age_seconds, 60);
        assert_eq!(config.feed.hours_available, 24);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[feed]"));
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[cache]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[feed]\nbase_url = \"http://localhost:9000/feed/\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.feed.base_url, "http://localhost:9000/feed/");

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[feed\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_merge_with_args_only_overrides_provided() {
        let mut config = Config::default();
        let mut args = bare_args();
        args.model = Some("local-model".to_string());
        args.timeout = Some(10);
        args.command = Some(Command::Serve {
            host: None,
            port: Some(9090),
        });

        config.merge_with_args(&args);

        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.feed.timeout_seconds, 10);
        assert_eq!(config.llm.timeout_seconds, 10);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.feed.base_url, "https://a.windbornesystems.com/treasure/");
    }
}
