//! Manages the state of background submission jobs.
//!
//! Submission jobs run outside the request/response cycle (see
//! `services/submissions/start.rs`) and report their progress here so the
//! status endpoint can serve it.
//!
//! The main components are:
//! - `JobsState`: a clonable, thread-safe handle to every known job. It is
//!   injected into the Actix application state in `main.rs`.
//! - `JobUpdate`: a message carrying a new job status plus the rows that have
//!   been processed so far.
//! - `start_job_updater`: a long-running task that drains `JobUpdate`s from an
//!   MPSC channel and applies them to the shared map.
//!
//! Only the most recent `MAX_FINISHED_JOBS` completed or failed jobs are kept;
//! older ones are evicted as new jobs finish.

use freight_common::jobs::JobStatus;
use freight_common::model::shipment::Shipment;
use freight_common::model::submission::SubmissionJob;
use log::{debug, warn};
use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::{mpsc, Mutex, RwLock};

/// Finished jobs retained for status polling and export.
pub const MAX_FINISHED_JOBS: usize = 100;

/// A thread-safe, shareable container for the state of all submission jobs.
#[derive(Clone)]
pub struct JobsState {
    /// Job ID to job. Read by the status and export endpoints, written only by
    /// `start_job_updater` once a job has been registered.
    pub jobs: Arc<RwLock<HashMap<String, SubmissionJob>>>,

    /// Sender side of the update channel. Workers push `JobUpdate`s here
    /// instead of locking `jobs` themselves.
    pub tx: mpsc::Sender<JobUpdate>,

    /// Ids of finished jobs, oldest first.
    finished: Arc<Mutex<VecDeque<String>>>,
    max_finished: usize,
}

impl JobsState {
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        Self::with_retention(tx, MAX_FINISHED_JOBS)
    }

    pub fn with_retention(tx: mpsc::Sender<JobUpdate>, max_finished: usize) -> Self {
        JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
            finished: Arc::new(Mutex::new(VecDeque::new())),
            max_finished,
        }
    }

    pub async fn register(&self, job: SubmissionJob) {
        self.jobs.write().await.insert(job.job_id.clone(), job);
    }

    /// A snapshot of the job, if it exists.
    pub async fn get(&self, job_id: &str) -> Option<SubmissionJob> {
        self.jobs.read().await.get(job_id).cloned()
    }

    /// Records `job_id` as finished and evicts the oldest finished jobs
    /// beyond the retention limit.
    async fn retire(&self, jobs: &mut HashMap<String, SubmissionJob>, job_id: &str) {
        let mut finished = self.finished.lock().await;
        if finished.iter().any(|id| id == job_id) {
            return;
        }
        finished.push_back(job_id.to_string());
        while finished.len() > self.max_finished {
            if let Some(evicted) = finished.pop_front() {
                jobs.remove(&evicted);
                debug!("Evicted finished job {}", evicted);
            }
        }
    }
}

/// A status change for one job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
    /// Rows processed so far, in batch order. Empty for status-only updates.
    pub(crate) processed: Vec<Shipment>,
}

impl JobUpdate {
    pub fn status(job_id: impl Into<String>, status: JobStatus) -> Self {
        JobUpdate {
            job_id: job_id.into(),
            status,
            processed: Vec::new(),
        }
    }
}

/// Applies every `JobUpdate` received on `rx` to the shared job map.
///
/// Spawned once from `main.rs`; runs until all senders are dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        let Some(job) = jobs.get_mut(&update.job_id) else {
            warn!("Dropping update for unknown job {}", update.job_id);
            continue;
        };
        let finished = matches!(update.status, JobStatus::Completed(_) | JobStatus::Failed(_));
        job.status = update.status;
        job.apply_progress(update.processed);
        if finished {
            state.retire(&mut jobs, &update.job_id).await;
        }
    }
}
