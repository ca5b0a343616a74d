//! Configuration loading and management.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "task-bot.yaml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub bot: BotConfig,
}

/// HTTP and storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Interface both HTTP servers bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the liveness endpoint.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port of the REST API.
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Whether to serve the REST API next to the bot.
    #[serde(default = "default_true")]
    pub api_enabled: bool,

    /// Upper bound on threads running blocking store calls.
    #[serde(default = "default_blocking_threads")]
    pub blocking_threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            host: default_host(),
            port: default_port(),
            api_port: default_api_port(),
            api_enabled: true,
            blocking_threads: default_blocking_threads(),
        }
    }
}

/// Chat bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API access token. Usually supplied through `BOT_TOKEN`.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Long-poll timeout for `getUpdates`, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,

    /// Idle time after which a half-finished guided dialog is forgotten.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            poll_timeout_seconds: default_poll_timeout(),
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

impl BotConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/tasks.db")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_api_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

fn default_blocking_threads() -> usize {
    8
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_session_ttl() -> u64 {
    3600 // 1 hour
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Load from an explicit file, else from `task-bot.yaml` if present, else
    /// defaults. Environment variables are applied on top.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override values from environment variables, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN") {
            self.bot.token = Some(token);
        }

        if let Some(db_path) = lookup("TASK_BOT_DB_PATH") {
            self.server.db_path = PathBuf::from(db_path);
        }

        if let Some(port) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        if let Some(port) = lookup("API_PORT").and_then(|v| v.parse().ok()) {
            self.server.api_port = port;
        }

        if let Some(threads) = lookup("TASK_BOT_BLOCKING_THREADS").and_then(|v| v.parse().ok()) {
            self.server.blocking_threads = threads;
        }

        if let Some(ttl) = lookup("TASK_BOT_SESSION_TTL").and_then(|v| v.parse().ok()) {
            self.bot.session_ttl_seconds = ttl;
        }

        if let Some(timeout) = lookup("TASK_BOT_POLL_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.bot.poll_timeout_seconds = timeout;
        }
    }

    /// The bot token. Missing or blank is a startup error.
    pub fn bot_token(&self) -> Result<&str> {
        self.bot
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("BOT_TOKEN is not set (environment or .env file)"))
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
