//! # Configuration
//!
//! Strongly-typed settings for the service, loaded in layers with the
//! `config` crate, plus the process-wide logging setup.
//!
//! Precedence, lowest first: built-in defaults, `config.toml` (or an explicit
//! file), `APP__SECTION__KEY` environment variables, and finally the plain
//! `DATABASE_URL` / `DATABASE_ECHO` variables.

use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    DatabaseSettings, JobSettings, JobsSettings, LoggingSettings, RateLimitSettings,
    ServerSettings, Settings, StaticFilesSettings,
};

/// Base name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Loads the application configuration using the process environment.
///
/// When `path` is `None`, `config.toml` in the working directory is used if it
/// exists. An explicit `path` must exist.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_config_from(path, std::env::vars().collect())
}

/// Same as [`load_config`] but reads environment overrides from `env`
/// instead of the process environment.
pub fn load_config_from(
    path: Option<&Path>,
    env: config::Map<String, String>,
) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let mut builder = config::Config::builder().add_source(file).add_source(
        config::Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(env.clone())),
    );

    if let Some(url) = env.get("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
        builder = builder.set_override("database.url", url.as_str())?;
    }
    if let Some(echo) = env.get("DATABASE_ECHO") {
        builder = builder.set_override("database.echo", parse_flag(echo))?;
    }

    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

/// Interprets the usual truthy spellings of an on/off environment variable.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
