use crate::error::SchedulerError;
use crate::{Schedule, Scheduler};
use core_types::NewRecord;
use services::RecordService;

pub const JOB_ID: &str = "create_record";

/// The fixed record the demo job inserts on every run.
pub fn canned_record() -> NewRecord {
    NewRecord::new("Test Job")
}

/// One run of the job: insert the canned record and log the outcome.
/// Failures are logged and otherwise ignored; there is no retry.
pub async fn create_canned_record(service: &RecordService) -> Option<i64> {
    let id = service.create(canned_record()).await;
    match id {
        Some(id) => tracing::info!(job = JOB_ID, id, "Job executed."),
        None => tracing::warn!(job = JOB_ID, "Job could not create a record."),
    }
    id
}

pub async fn register(
    scheduler: &Scheduler,
    service: RecordService,
    schedule: Schedule,
) -> Result<(), SchedulerError> {
    scheduler
        .add_job(JOB_ID, schedule, move || {
            let service = service.clone();
            async move {
                create_canned_record(&service).await;
            }
        })
        .await
}
