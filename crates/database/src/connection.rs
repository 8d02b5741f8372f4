use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::time::Duration;

/// Establishes a connection pool to the SQLite database described by `settings`.
///
/// File databases are created on first use. In-memory databases exist per
/// connection, so they are pinned to a single connection that never expires.
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(|e| DbError::ConnectionConfigError(format!("{}: {e}", settings.url)))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let options = if settings.echo {
        options.log_statements(log::LevelFilter::Info)
    } else {
        options.disable_statement_logging()
    };

    let pool_options = if is_in_memory(&settings.url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections)
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    tracing::info!(url = %settings.url, echo = settings.echo, "Connected to the database.");
    Ok(pool)
}

/// Applies the migrations embedded from `./migrations` at compile time.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://shared?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://app.db?mode=rwc"));
    }

    #[tokio::test]
    async fn rejects_unparseable_url() {
        let settings = DatabaseSettings {
            url: "sqlite://app.db?mode=bogus".to_string(),
            ..DatabaseSettings::default()
        };
        let err = connect(&settings).await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionConfigError(_)));
    }
}
