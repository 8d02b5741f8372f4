//! # Scheduler
//!
//! A small in-process job scheduler. Each registered job runs on its own tokio
//! task, sleeping until its next trigger, so a slow run delays only that job's
//! next tick and never overlaps with itself.
//!
//! The `Scheduler` is an explicit handle: the process entry point creates it,
//! registers jobs, calls `start`, and calls `shutdown` on exit.

use crate::error::SchedulerError;
use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

pub mod error;
pub mod jobs;
pub mod schedule;

pub use schedule::Schedule;

type JobFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// A read-only view of a registered job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    pub id: String,
    pub schedule: Schedule,
    /// `true` once the job's timer task has been spawned.
    pub armed: bool,
}

struct JobEntry {
    schedule: Schedule,
    job: JobFn,
    cancel: Option<CancellationToken>,
}

#[derive(Default)]
struct State {
    jobs: HashMap<String, JobEntry>,
    running: bool,
    shut_down: bool,
}

/// Handle to the scheduler. Cloning shares the same jobs and lifecycle.
#[derive(Clone)]
pub struct Scheduler {
    state: Arc<Mutex<State>>,
    root: CancellationToken,
    tracker: TaskTracker,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            root: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Registers `job` under `id`. If the scheduler is already running the
    /// job is armed immediately.
    pub async fn add_job<F, Fut>(
        &self,
        id: impl Into<String>,
        schedule: Schedule,
        job: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = id.into();
        let mut state = self.state.lock().await;
        if state.shut_down {
            return Err(SchedulerError::ShutDown);
        }
        if state.jobs.contains_key(&id) {
            return Err(SchedulerError::DuplicateJob(id));
        }

        let job: JobFn = Arc::new(move || job().boxed());
        let cancel = state
            .running
            .then(|| self.arm(id.clone(), schedule, job.clone()));

        tracing::info!(job = %id, ?schedule, "Registered scheduled job.");
        state.jobs.insert(
            id,
            JobEntry {
                schedule,
                job,
                cancel,
            },
        );
        Ok(())
    }

    /// Unregisters a job and stops its timer. A run already in progress is
    /// allowed to finish. Returns `false` if no such job exists.
    pub async fn remove_job(&self, id: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.jobs.remove(id) {
            Some(entry) => {
                if let Some(cancel) = entry.cancel {
                    cancel.cancel();
                }
                tracing::info!(job = %id, "Removed scheduled job.");
                true
            }
            None => false,
        }
    }

    pub async fn get_job(&self, id: &str) -> Option<JobInfo> {
        let state = self.state.lock().await;
        state.jobs.get(id).map(|entry| JobInfo {
            id: id.to_string(),
            schedule: entry.schedule,
            armed: entry.cancel.is_some(),
        })
    }

    /// Ids of all registered jobs, sorted.
    pub async fn job_ids(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut ids: Vec<String> = state.jobs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Runs a registered job once on the calling task, outside its schedule.
    /// Returns `false` if no such job exists.
    pub async fn run_now(&self, id: &str) -> bool {
        let job = {
            let state = self.state.lock().await;
            state.jobs.get(id).map(|entry| entry.job.clone())
        };
        match job {
            Some(job) => {
                job().await;
                true
            }
            None => false,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.running
    }

    /// Arms every registered job. Calling `start` on a running scheduler is a
    /// no-op; calling it after `shutdown` is an error.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut state = self.state.lock().await;
        if state.shut_down {
            return Err(SchedulerError::ShutDown);
        }
        if state.running {
            return Ok(());
        }
        state.running = true;

        let mut armed = 0;
        for (id, entry) in state.jobs.iter_mut() {
            entry.cancel = Some(self.arm(id.clone(), entry.schedule, entry.job.clone()));
            armed += 1;
        }
        tracing::info!(jobs = armed, "Scheduler started.");
        Ok(())
    }

    /// Stops every timer and waits for runs in progress to complete.
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.lock().await;
            if state.shut_down {
                return;
            }
            state.shut_down = true;
            state.running = false;
            for entry in state.jobs.values_mut() {
                entry.cancel = None;
            }
        }

        self.root.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        tracing::info!("Scheduler shut down.");
    }

    fn arm(&self, id: String, schedule: Schedule, job: JobFn) -> CancellationToken {
        let cancel = self.root.child_token();
        let token = cancel.clone();

        self.tracker.spawn(async move {
            loop {
                let delay = schedule.delay_from(Utc::now());
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
                tracing::debug!(job = %id, "Running scheduled job.");
                job().await;
            }
            tracing::debug!(job = %id, "Scheduled job stopped.");
        });

        cancel
    }
}
