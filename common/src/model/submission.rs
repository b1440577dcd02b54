use crate::jobs::JobStatus;
use crate::model::shipment::{ProgressStatus, Shipment};
use serde::{Deserialize, Serialize};

/// A background run that submits a validated batch to the emissions API.
///
/// The job is created when `POST /api/submissions/start` accepts a batch and is
/// polled by the client through `GET /api/submissions/status/{job_id}`. The
/// `shipments` vector always holds the whole batch in its original order; rows
/// are updated in place as the worker reaches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionJob {
    /// Unique identifier for this job (UUID).
    pub job_id: String,
    /// Overall state of the job.
    pub status: JobStatus,
    /// Every shipment in the batch, with its per-row `progress_status`.
    pub shipments: Vec<Shipment>,
}

impl SubmissionJob {
    /// Registers a new job. All rows start out pending.
    pub fn new(job_id: impl Into<String>, shipments: Vec<Shipment>) -> Self {
        let shipments = shipments
            .into_iter()
            .map(|mut s| {
                s.progress_status = ProgressStatus::Pending;
                s.error_message = None;
                s.results = None;
                s
            })
            .collect();
        SubmissionJob {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            shipments,
        }
    }

    /// Overwrites the first `processed.len()` rows with their submitted state.
    pub fn apply_progress(&mut self, processed: Vec<Shipment>) {
        for (slot, shipment) in self.shipments.iter_mut().zip(processed) {
            *slot = shipment;
        }
    }

    pub fn count_with_status(&self, status: ProgressStatus) -> usize {
        self.shipments
            .iter()
            .filter(|s| s.progress_status == status)
            .count()
    }
}
