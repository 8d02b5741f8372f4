use crate::error::ConfigError;
use core_types::RandomPolicy;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty (or missing) `config.toml` yields a
/// runnable service backed by a local SQLite file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub rate_limit: RateLimitSettings,
    pub static_files: StaticFilesSettings,
    pub jobs: JobsSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP listener binds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body size.
    pub body_limit_bytes: usize,
}

/// Connection parameters for the relational store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// An sqlx connection string, e.g. `sqlite://app.db?mode=rwc` or `sqlite::memory:`.
    pub url: String,
    /// Log every executed statement at INFO.
    pub echo: bool,
    pub max_connections: u32,
    pub random_policy: RandomPolicy,
}

/// Request throttling. Both limits apply; the per-client one is checked first.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    /// Requests per second accepted across all clients.
    pub global_per_second: u32,
    /// Requests per second accepted from a single client IP.
    pub per_ip_per_second: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesSettings {
    pub enabled: bool,
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobsSettings {
    pub create_record: JobSettings,
}

/// Cadence of a scheduled job. `interval_secs`, when present, replaces the
/// daily `hour:minute` (UTC) trigger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    pub enabled: bool,
    pub hour: u32,
    pub minute: u32,
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://app.db?mode=rwc".to_string(),
            echo: false,
            max_connections: 5,
            random_policy: RandomPolicy::default(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            global_per_second: 1,
            per_ip_per_second: 5,
        }
    }
}

impl Default for StaticFilesSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("public"),
        }
    }
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: 6,
            minute: 0,
            interval_secs: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "starter.log".to_string(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("server address: {e}")))
    }
}

impl Settings {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must be non-zero".into()));
        }
        self.server.socket_addr()?;
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError("database.url must be set".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be non-zero".into(),
            ));
        }
        if self.rate_limit.enabled
            && (self.rate_limit.global_per_second == 0 || self.rate_limit.per_ip_per_second == 0)
        {
            return Err(ConfigError::ValidationError(
                "rate limits must be non-zero when rate limiting is enabled".into(),
            ));
        }
        self.jobs.create_record.validate("jobs.create_record")?;
        Ok(())
    }
}

impl JobSettings {
    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.hour > 23 {
            return Err(ConfigError::ValidationError(format!("{section}.hour must be < 24")));
        }
        if self.minute > 59 {
            return Err(ConfigError::ValidationError(format!("{section}.minute must be < 60")));
        }
        if self.interval_secs == Some(0) {
            return Err(ConfigError::ValidationError(format!(
                "{section}.interval_secs must be positive"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.server.socket_addr().unwrap().port(), 3000);
        assert_eq!(settings.jobs.create_record.hour, 6);
    }

    #[test]
    fn rejects_out_of_range_job_time() {
        let mut settings = Settings::default();
        settings.jobs.create_record.minute = 60;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("jobs.create_record.minute"));
    }

    #[test]
    fn zero_limits_only_matter_when_enabled() {
        let mut settings = Settings::default();
        settings.rate_limit.global_per_second = 0;
        assert!(settings.validate().is_err());

        settings.rate_limit.enabled = false;
        settings.validate().unwrap();
    }
}
