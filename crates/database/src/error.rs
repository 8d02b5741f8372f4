use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("The requested data was not found in the database.")]
    NotFound,
}

impl DbError {
    /// `true` for a missing row, `false` for a fault in the store itself.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound)
    }
}
