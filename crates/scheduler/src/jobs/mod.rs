//! The jobs this service schedules.

use crate::error::SchedulerError;
use crate::{Schedule, Scheduler};
use configuration::JobsSettings;
use services::RecordService;

pub mod record;

/// Registers every enabled job from `settings` on `scheduler`.
pub async fn register_all(
    scheduler: &Scheduler,
    service: &RecordService,
    settings: &JobsSettings,
) -> Result<(), SchedulerError> {
    if settings.create_record.enabled {
        let schedule = Schedule::try_from(&settings.create_record)?;
        record::register(scheduler, service.clone(), schedule).await?;
    } else {
        tracing::info!(job = record::JOB_ID, "Job disabled by configuration.");
    }
    Ok(())
}
