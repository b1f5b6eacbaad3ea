//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `scenariobot.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use scenariobot_app::dispatcher::DispatcherConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Conversation and reply settings.
    pub conversation: ConversationConfig,
    /// Schedule queue settings.
    pub scheduler: SchedulerConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Longest accepted conversation idle timeout: one year.
pub const MAX_IDLE_TIMEOUT_SECS: i64 = 365 * 24 * 60 * 60;

/// Conversation behaviour.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Seconds after the last answer before a conversation is dropped.
    pub idle_timeout_secs: i64,
    /// Alias of the event replaying the last execution.
    pub repeat_alias: String,
    pub cancel_reply: String,
    pub unknown_reply: String,
    /// Maximum number of "did you mean" suggestions.
    pub suggestion_limit: usize,
}

/// Schedule queue ticking.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between two checks for due items.
    pub tick_secs: u64,
}

impl Config {
    /// Load configuration from `scenariobot.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("scenariobot.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SCENARIOBOT_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("SCENARIOBOT_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = lookup("SCENARIOBOT_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("SCENARIOBOT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("SCENARIOBOT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("SCENARIOBOT_IDLE_TIMEOUT_SECS")
            && let Ok(secs) = val.parse()
        {
            self.conversation.idle_timeout_secs = secs;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if !(1..=MAX_IDLE_TIMEOUT_SECS).contains(&self.conversation.idle_timeout_secs) {
            return Err(ConfigError::Validation(format!(
                "conversation.idle_timeout_secs must be between 1 and {MAX_IDLE_TIMEOUT_SECS}"
            )));
        }
        if self.conversation.repeat_alias.trim().is_empty() {
            return Err(ConfigError::Validation(
                "conversation.repeat_alias must not be empty".to_string(),
            ));
        }
        if self.scheduler.tick_secs == 0 {
            return Err(ConfigError::Validation(
                "scheduler.tick_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Dispatcher tunables taken from the `[conversation]` section.
    #[must_use]
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            idle_timeout: chrono::Duration::try_seconds(self.conversation.idle_timeout_secs)
                .unwrap_or_else(|| chrono::Duration::seconds(MAX_IDLE_TIMEOUT_SECS)),
            repeat_alias: self.conversation.repeat_alias.clone(),
            cancel_reply: self.conversation.cancel_reply.clone(),
            unknown_reply: self.conversation.unknown_reply.clone(),
            suggestion_limit: self.conversation.suggestion_limit,
        }
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.tick_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:scenariobot.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "scenariobotd=info,scenariobot=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        let dispatcher = DispatcherConfig::default();
        Self {
            idle_timeout_secs: dispatcher.idle_timeout.num_seconds(),
            repeat_alias: dispatcher.repeat_alias,
            cancel_reply: dispatcher.cancel_reply,
            unknown_reply: dispatcher.unknown_reply,
            suggestion_limit: dispatcher.suggestion_limit,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_secs: 5 }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
