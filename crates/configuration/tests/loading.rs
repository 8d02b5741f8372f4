use configuration::{load_config_from, ConfigError};
use core_types::RandomPolicy;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn empty_file_yields_defaults() {
    let dir = TempDir::new().expect("tmp");
    let path = write_config(&dir, "");

    let settings = load_config_from(Some(&path), env(&[])).expect("settings");
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.database.url, "sqlite://app.db?mode=rwc");
    assert!(!settings.database.echo);
    assert_eq!(settings.database.random_policy, RandomPolicy::Uniform);
    assert_eq!(settings.rate_limit.global_per_second, 1);
    assert_eq!(settings.rate_limit.per_ip_per_second, 5);
    assert_eq!(settings.jobs.create_record.interval_secs, None);
}

#[test]
fn file_values_override_defaults() {
    let dir = TempDir::new().expect("tmp");
    let path = write_config(
        &dir,
        r#"
        [server]
        port = 8081

        [database]
        random_policy = "latest"

        [jobs.create_record]
        interval_secs = 30
        "#,
    );

    let settings = load_config_from(Some(&path), env(&[])).expect("settings");
    assert_eq!(settings.server.port, 8081);
    assert_eq!(settings.database.random_policy, RandomPolicy::Latest);
    assert_eq!(settings.jobs.create_record.interval_secs, Some(30));
    // Untouched keys in a partially specified section keep their defaults.
    assert_eq!(settings.jobs.create_record.hour, 6);
}

#[test]
fn prefixed_environment_overrides_file() {
    let dir = TempDir::new().expect("tmp");
    let path = write_config(&dir, "[server]\nport = 8081\n");

    let settings = load_config_from(
        Some(&path),
        env(&[("APP__SERVER__PORT", "9090"), ("APP__RATE_LIMIT__ENABLED", "false")]),
    )
    .expect("settings");
    assert_eq!(settings.server.port, 9090);
    assert!(!settings.rate_limit.enabled);
}

#[test]
fn plain_database_variables_win() {
    let dir = TempDir::new().expect("tmp");
    let path = write_config(&dir, "[database]\nurl = \"sqlite://from-file.db\"\n");

    let settings = load_config_from(
        Some(&path),
        env(&[
            ("APP__DATABASE__URL", "sqlite://from-app-env.db"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_ECHO", "1"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.database.url, "sqlite::memory:");
    assert!(settings.database.echo);
}

#[test]
fn invalid_values_fail_validation() {
    let dir = TempDir::new().expect("tmp");
    let path = write_config(&dir, "[jobs.create_record]\nhour = 24\n");

    let err = load_config_from(Some(&path), env(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = TempDir::new().expect("tmp");
    let missing = dir.path().join("nope.toml");

    let err = load_config_from(Some(&missing), env(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::LoadError(_)));
}
