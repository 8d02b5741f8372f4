use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("A job with id `{0}` is already registered.")]
    DuplicateJob(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("The scheduler has been shut down.")]
    ShutDown,
}
