//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `loopctl.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use loopctl_adapter_virtual::VirtualPumpConfig;
use loopctl_domain::offline::UNKNOWN_OFFLINE_MINUTES;
use serde::Deserialize;

/// Everything `loopctld` reads at startup.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Loop control behaviour.
    #[serde(rename = "loop")]
    pub control: LoopConfig,
    /// Simulated pump.
    pub pump: PumpConfig,
    /// Dosing profile reported to the loop.
    pub profile: ProfileConfig,
}

/// Where the JSON API listens.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlx` `SQLite` URL holding loop settings and offline records.
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `LOOPCTL_LOG` then `RUST_LOG`.
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Ask for confirmation before applying any loop action.
    pub confirmation_required: bool,
    /// Offline duration recorded when the loop is disabled.
    pub unknown_offline_minutes: u32,
    /// Safety gate for closed-loop operation, on top of training progress.
    pub closed_loop_permitted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    pub disconnect_15m_supported: bool,
    pub disconnect_30m_supported: bool,
    pub command_latency_ms: u64,
    pub fail_commands: bool,
}

/// Without a `[profile]` section a profile named `Default` is reported; a
/// section without `name` reports no profile at all.
#[derive(Debug, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub name: Option<String>,
}

impl Config {
    /// Load configuration from `loopctl.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("loopctl.toml")?;
        config.apply_env_overrides();
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

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LOOPCTL_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("LOOPCTL_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("LOOPCTL_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("LOOPCTL_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("LOOPCTL_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.control.unknown_offline_minutes == 0 {
            return Err(ConfigError::Validation(
                "unknown_offline_minutes must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl PumpConfig {
    #[must_use]
    pub fn virtual_pump(&self) -> VirtualPumpConfig {
        VirtualPumpConfig {
            disconnect_15m: self.disconnect_15m_supported,
            disconnect_30m: self.disconnect_30m_supported,
            command_latency: Duration::from_millis(self.command_latency_ms),
            fail_commands: self.fail_commands,
        }
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
            url: "sqlite:loopctl.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "loopctld=info,loopctl=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            confirmation_required: true,
            unknown_offline_minutes: UNKNOWN_OFFLINE_MINUTES,
            closed_loop_permitted: true,
        }
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            disconnect_15m_supported: true,
            disconnect_30m_supported: true,
            command_latency_ms: 200,
            fail_commands: false,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: Some("Default".to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("loopctl.toml is not valid TOML")]
    Parse(#[from] toml::de::Error),
    #[error("loopctl.toml could not be read")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}
