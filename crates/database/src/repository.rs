use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{NewRecord, RandomPolicy, Record};
use sqlx::sqlite::SqlitePool;

const SELECT_RECORD: &str = "SELECT id, field1, field2, created_at, updated_at FROM records";

/// The `RecordRepository` provides the application-specific interface to the
/// `records` table. It encapsulates all SQL for the entity.
///
/// Errors are returned as-is: a missing row is `DbError::NotFound`, anything
/// else is a fault in the store. Deciding what callers see is left to the
/// service layer.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    pool: SqlitePool,
    random_policy: RandomPolicy,
}

impl RecordRepository {
    /// Creates a new `RecordRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool, random_policy: RandomPolicy) -> Self {
        Self {
            pool,
            random_policy,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn random_policy(&self) -> RandomPolicy {
        self.random_policy
    }

    /// Inserts a record stamped with `at` and returns the id the store assigned.
    pub async fn insert(&self, record: &NewRecord, at: DateTime<Utc>) -> Result<i64, DbError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            "INSERT INTO records (field1, field2, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.field1)
        .bind(record.field2)
        .bind(at)
        .bind(at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        Ok(id)
    }

    /// Point lookup by primary key.
    pub async fn find_by_id(&self, id: i64) -> Result<Record, DbError> {
        sqlx::query_as::<_, Record>(&format!("{SELECT_RECORD} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    /// Returns one existing row chosen according to the configured policy.
    pub async fn find_random(&self) -> Result<Record, DbError> {
        let order = match self.random_policy {
            RandomPolicy::Uniform => "RANDOM()",
            RandomPolicy::Latest => "id DESC",
        };

        sqlx::query_as::<_, Record>(&format!("{SELECT_RECORD} ORDER BY {order} LIMIT 1"))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    /// Overwrites `field1`/`field2` of an existing row and stamps `updated_at`.
    /// `id` and `created_at` are never touched.
    pub async fn update(
        &self,
        id: i64,
        patch: &NewRecord,
        at: DateTime<Utc>,
    ) -> Result<Record, DbError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Record>(&format!("{SELECT_RECORD} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

        sqlx::query("UPDATE records SET field1 = ?, field2 = ?, updated_at = ? WHERE id = ?")
            .bind(&patch.field1)
            .bind(patch.field2)
            .bind(at)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Record {
            field1: patch.field1.clone(),
            field2: patch.field2,
            updated_at: at,
            ..existing
        })
    }

    /// Removes the row with `id`. A missing row is `DbError::NotFound`.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM records WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            return Err(DbError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Round-trips a trivial statement to confirm the store is reachable.
    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Number of rows in the table.
    pub async fn count(&self) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
