use crate::error::SchedulerError;
use chrono::{DateTime, Days, Utc};
use configuration::JobSettings;
use std::time::Duration;

/// When a job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Once a day at `hour:minute` UTC.
    Daily { hour: u32, minute: u32 },
    /// Repeatedly, the first run one full interval after the job is armed.
    Interval(Duration),
}

impl Schedule {
    pub fn daily(hour: u32, minute: u32) -> Result<Self, SchedulerError> {
        if hour > 23 || minute > 59 {
            return Err(SchedulerError::InvalidSchedule(format!(
                "{hour:02}:{minute:02} is not a time of day"
            )));
        }
        Ok(Schedule::Daily { hour, minute })
    }

    pub fn every(interval: Duration) -> Result<Self, SchedulerError> {
        if interval.is_zero() {
            return Err(SchedulerError::InvalidSchedule("interval must be positive".into()));
        }
        Ok(Schedule::Interval(interval))
    }

    /// The next instant strictly after `now` at which the job should run.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Schedule::Interval(interval) => chrono::Duration::from_std(interval)
                .ok()
                .and_then(|step| now.checked_add_signed(step))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            Schedule::Daily { hour, minute } => {
                let today = now
                    .date_naive()
                    .and_hms_opt(hour, minute, 0)
                    .map(|t| t.and_utc());
                match today {
                    Some(at) if at > now => at,
                    Some(at) => at.checked_add_days(Days::new(1)).unwrap_or(at),
                    // Unreachable for schedules built through `daily`.
                    None => now + chrono::Duration::days(1),
                }
            }
        }
    }

    /// How long to sleep from `now` until the next run.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Duration {
        (self.next_after(now) - now).to_std().unwrap_or(Duration::ZERO)
    }
}

impl TryFrom<&JobSettings> for Schedule {
    type Error = SchedulerError;

    fn try_from(settings: &JobSettings) -> Result<Self, Self::Error> {
        match settings.interval_secs {
            Some(secs) => Schedule::every(Duration::from_secs(secs)),
            None => Schedule::daily(settings.hour, settings.minute),
        }
    }
}
