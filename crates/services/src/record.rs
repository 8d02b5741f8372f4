use chrono::Utc;
use core_types::{NewRecord, Record};
use database::{DbError, RecordRepository};

/// Data access for records with failures contained.
///
/// "Not found" and "the store failed" both come back as `None`/`false`; the
/// difference only shows up in the logs.
#[derive(Debug, Clone)]
pub struct RecordService {
    repo: RecordRepository,
}

impl RecordService {
    pub fn new(repo: RecordRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &RecordRepository {
        &self.repo
    }

    /// Stamps `created_at`, persists the record and returns its new id.
    /// Returns `None` if the insert failed; nothing is written in that case.
    pub async fn create(&self, record: NewRecord) -> Option<i64> {
        let now = Utc::now();
        match self.repo.insert(&record, now).await {
            Ok(id) => Some(id),
            Err(e) => {
                log_failure("create", &e);
                None
            }
        }
    }

    pub async fn find_by_id(&self, id: i64) -> Option<Record> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| log_failure("find by id", &e))
            .ok()
    }

    /// Some existing row, or `None` when the table is empty or the query failed.
    pub async fn get_random_row(&self) -> Option<Record> {
        self.repo
            .find_random()
            .await
            .map_err(|e| log_failure("get random row", &e))
            .ok()
    }

    /// Copies `field1`/`field2` from `patch` onto the record and stamps
    /// `updated_at`. `None` if the record does not exist or the update failed.
    pub async fn update(&self, id: i64, patch: NewRecord) -> Option<Record> {
        self.repo
            .update(id, &patch, Utc::now())
            .await
            .map_err(|e| log_failure("update", &e))
            .ok()
    }

    /// `true` only if a row was actually removed.
    pub async fn delete(&self, id: i64) -> bool {
        match self.repo.delete(id).await {
            Ok(()) => true,
            Err(e) => {
                log_failure("delete", &e);
                false
            }
        }
    }
}

/// Missing rows are routine and logged at debug; anything else is an error.
fn log_failure(operation: &str, error: &DbError) {
    if error.is_not_found() {
        tracing::debug!(operation, "[record] no matching row");
    } else {
        tracing::error!(operation, error = %error, "[record] storage operation failed");
    }
}
