//! # Submission Job Start Service
//!
//! Provides the `POST /api/submissions/start` endpoint, which submits every
//! shipment of a validated batch to the emissions API.
//!
//! ## Workflow:
//!
//! 1.  **Gate**: the batch is validated again on the server. Only a non-empty
//!     batch with an empty report may be submitted; otherwise the report is
//!     returned with `400 Bad Request`.
//!
//! 2.  **Configuration**: the Climatiq API key and base URL are resolved. If
//!     either is missing the request fails before anything is sent.
//!
//! 3.  **Job Scheduling**: `schedule_submission_job` registers a
//!     `SubmissionJob` as `Pending`, returns its `job_id` immediately and
//!     spawns a Tokio task that owns the run.
//!
//! 4.  **Sequential Submission**: `submit_shipments` sends the rows strictly one
//!     after another, pausing `SUBMISSION_DELAY` between rows. A failing row is
//!     marked `error` with its message and the batch carries on.
//!
//! 5.  **Progress Reporting**: after each row the processed prefix is sent as a
//!     `SubmissionUpdate` on a per-job channel. A listener forwards these to
//!     the central `job_controller` in order, so the final `Completed` status is
//!     always applied after the last row update.

use crate::config::{AppConfig, ConfigurationError};
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::submissions::client::{ClimatiqClient, ShipmentSubmitter};
use actix_web::{web, HttpResponse, Responder};
use freight_common::jobs::JobStatus;
use freight_common::model::report::ValidationReport;
use freight_common::model::shipment::{ProgressStatus, Shipment};
use freight_common::model::submission::SubmissionJob;
use freight_common::requests::StartSubmissionRequest;
use freight_common::responses::StartSubmissionResponse;
use freight_common::validation::validate_shipments;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Pause between two consecutive API calls.
pub const SUBMISSION_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum StartError {
    #[error("Shipments are not ready for submission")]
    NotReady(ValidationReport),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Progress messages from a running job to its listener.
#[derive(Debug)]
pub enum SubmissionUpdate {
    /// Overall job status (completion or failure).
    Job(JobStatus),
    /// The rows processed so far and the batch size.
    Rows {
        processed: Vec<Shipment>,
        total_rows: usize,
    },
}

/// The Actix web handler for `POST /api/submissions/start`.
///
/// - `200 OK` with `{ "job_id": ... }` once the job is scheduled.
/// - `400 Bad Request` with the `ValidationReport` if the batch is not ready.
/// - `500 Internal Server Error` if the API credentials are not configured.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    config: web::Data<AppConfig>,
    payload: web::Json<StartSubmissionRequest>,
) -> impl Responder {
    let shipments = payload.into_inner().shipments;

    let ready = check_ready(&shipments)
        .and_then(|()| config.submission().map_err(StartError::from));
    let submitter = match ready {
        Ok(submission_config) => Arc::new(ClimatiqClient::new(submission_config)),
        Err(StartError::NotReady(report)) => {
            warn!(
                "Submission refused: {} rows, {} validation messages",
                shipments.len(),
                report.messages.len()
            );
            return HttpResponse::BadRequest().json(report);
        }
        Err(e @ StartError::Configuration(_)) => {
            error!("Submission aborted: {}", e);
            return HttpResponse::InternalServerError().body(e.to_string());
        }
    };

    let job_id = schedule_submission_job(&state, shipments, submitter, SUBMISSION_DELAY).await;
    HttpResponse::Ok().json(StartSubmissionResponse { job_id })
}

/// Re-runs validation and accepts only a non-empty, error-free batch.
pub fn check_ready(shipments: &[Shipment]) -> Result<(), StartError> {
    let report = validate_shipments(shipments);
    if report.is_ready_to_submit(shipments.len()) {
        Ok(())
    } else {
        Err(StartError::NotReady(report))
    }
}

/// Registers a pending job and spawns its run in the background.
///
/// Returns the new job id right away; progress is visible through `state`.
pub async fn schedule_submission_job(
    state: &JobsState,
    shipments: Vec<Shipment>,
    submitter: Arc<dyn ShipmentSubmitter>,
    delay: Duration,
) -> String {
    let job_id = Uuid::new_v4().to_string();
    let job = SubmissionJob::new(job_id.clone(), shipments);
    let shipments = job.shipments.clone();
    state.register(job).await;

    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<SubmissionUpdate>();

    // Forward this job's updates to the central job controller, in order.
    let central_tx = state.tx.clone();
    let job_id_for_listener = job_id.clone();
    tokio::spawn(async move {
        while let Some(update) = update_rx.recv().await {
            let job_update = match update {
                SubmissionUpdate::Job(status) => JobUpdate::status(&job_id_for_listener, status),
                SubmissionUpdate::Rows {
                    processed,
                    total_rows,
                } => JobUpdate {
                    job_id: job_id_for_listener.clone(),
                    status: JobStatus::InProgress(progress_percent(processed.len(), total_rows)),
                    processed,
                },
            };
            if let Err(e) = central_tx.send(job_update).await {
                warn!(
                    "Job controller is gone; dropping update for job {}",
                    e.0.job_id
                );
                break;
            }
        }
    });

    let job_id_for_run = job_id.clone();
    tokio::spawn(async move {
        let total = shipments.len();
        let run_tx = update_tx.clone();
        let handle = tokio::spawn(async move {
            let _ = run_tx.send(SubmissionUpdate::Job(JobStatus::InProgress(0)));
            submit_shipments(shipments, submitter.as_ref(), delay, |processed| {
                let _ = run_tx.send(SubmissionUpdate::Rows {
                    processed: processed.to_vec(),
                    total_rows: total,
                });
            })
            .await
        });

        let status = match handle.await {
            Ok(results) => {
                let succeeded = results
                    .iter()
                    .filter(|s| s.progress_status == ProgressStatus::Success)
                    .count();
                info!(
                    "Submission job {} finished: {} of {} shipments submitted",
                    job_id_for_run, succeeded, total
                );
                JobStatus::Completed(format!("Submitted {} of {} shipments", succeeded, total))
            }
            Err(e) => {
                error!("Submission job {} aborted: {}", job_id_for_run, e);
                JobStatus::Failed(format!("Task join error: {}", e))
            }
        };
        let _ = update_tx.send(SubmissionUpdate::Job(status));
    });

    job_id
}

fn progress_percent(processed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (processed * 100 / total) as u32
}

/// Submits `shipments` one at a time, in order.
///
/// Each row is reset to `pending` before its call and marked `success` (with
/// `results`) or `error` (with `error_message`) afterwards. `on_progress`
/// receives every row processed so far after each call. Returns the processed
/// batch.
pub async fn submit_shipments<S, F>(
    shipments: Vec<Shipment>,
    submitter: &S,
    delay: Duration,
    mut on_progress: F,
) -> Vec<Shipment>
where
    S: ShipmentSubmitter + ?Sized,
    F: FnMut(&[Shipment]),
{
    let total = shipments.len();
    let mut processed = Vec::with_capacity(total);

    for (index, mut shipment) in shipments.into_iter().enumerate() {
        shipment.progress_status = ProgressStatus::Pending;
        shipment.error_message = None;
        shipment.results = None;

        match submitter.submit(&shipment).await {
            Ok(result) => {
                shipment.progress_status = ProgressStatus::Success;
                shipment.results = Some(result);
            }
            Err(e) => {
                warn!("Shipment {} failed: {}", shipment.shipment_id, e);
                shipment.progress_status = ProgressStatus::Error;
                shipment.error_message = Some(e.to_string());
            }
        }

        processed.push(shipment);
        on_progress(&processed);

        if index + 1 < total && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_controller::state::start_job_updater;
    use crate::services::submissions::client::SubmissionError;
    use crate::services::submissions::configure_routes;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use async_trait::async_trait;
    use freight_common::model::shipment::WeightKg;
    use std::sync::Mutex;

    /// Succeeds for every shipment except the ids listed in `fail`.
    struct FakeSubmitter {
        fail: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSubmitter {
        fn failing(fail: Vec<&'static str>) -> Self {
            FakeSubmitter {
                fail,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ShipmentSubmitter for FakeSubmitter {
        async fn submit(&self, shipment: &Shipment) -> Result<String, SubmissionError> {
            self.calls.lock().unwrap().push(shipment.shipment_id.clone());
            if self.fail.iter().any(|id| *id == shipment.shipment_id) {
                return Err(SubmissionError::InvalidResponse("missing co2e".into()));
            }
            Ok(format!("{} kg", shipment.weight_kg.as_ref().unwrap()))
        }
    }

    fn shipment(id: &str) -> Shipment {
        Shipment {
            shipment_id: id.into(),
            origin_address: "Genoa".into(),
            destination_address: "Basel".into(),
            mode: Some("rail".into()),
            weight_kg: Some(WeightKg::from("10")),
            ..Shipment::default()
        }
    }

    #[tokio::test]
    async fn submits_rows_in_order_and_reports_progress() {
        let submitter = FakeSubmitter::failing(vec!["S2"]);
        let mut snapshots = Vec::new();

        let results = submit_shipments(
            vec![shipment("S1"), shipment("S2"), shipment("S3")],
            &submitter,
            Duration::ZERO,
            |processed| snapshots.push(processed.len()),
        )
        .await;

        assert_eq!(*submitter.calls.lock().unwrap(), vec!["S1", "S2", "S3"]);
        assert_eq!(snapshots, vec![1, 2, 3]);
        assert_eq!(results[0].progress_status, ProgressStatus::Success);
        assert_eq!(results[0].results.as_deref(), Some("10 kg"));
        assert_eq!(results[1].progress_status, ProgressStatus::Error);
        assert_eq!(
            results[1].error_message.as_deref(),
            Some("Invalid response format: missing co2e")
        );
        assert_eq!(results[2].progress_status, ProgressStatus::Success);
    }

    #[test]
    fn gate_requires_rows_and_a_clean_report() {
        assert!(matches!(check_ready(&[]), Err(StartError::NotReady(_))));
        assert!(matches!(
            check_ready(&[shipment("S1"), shipment("S1")]),
            Err(StartError::NotReady(_))
        ));
        assert!(check_ready(&[shipment("S1"), shipment("S2")]).is_ok());
    }

    #[test]
    fn percent_of_rows() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(3, 3), 100);
    }

    #[tokio::test]
    async fn scheduled_job_runs_to_completion() {
        let (tx, rx) = mpsc::channel(100);
        let state = JobsState::new(tx);
        tokio::spawn(start_job_updater(state.clone(), rx));

        let submitter = Arc::new(FakeSubmitter::failing(vec![]));
        let job_id = schedule_submission_job(
            &state,
            vec![shipment("S1"), shipment("S2")],
            submitter,
            Duration::ZERO,
        )
        .await;

        let mut job = state.get(&job_id).await.unwrap();
        for _ in 0..200 {
            if matches!(job.status, JobStatus::Completed(_)) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            job = state.get(&job_id).await.unwrap();
        }

        assert_eq!(
            job.status,
            JobStatus::Completed("Submitted 2 of 2 shipments".to_string())
        );
        assert_eq!(job.count_with_status(ProgressStatus::Success), 2);
    }

    #[tokio::test]
    async fn job_keeps_running_without_a_job_controller() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let state = JobsState::new(tx);

        let submitter = Arc::new(FakeSubmitter::failing(vec![]));
        let job_id = schedule_submission_job(
            &state,
            vec![shipment("S1"), shipment("S2")],
            submitter.clone(),
            Duration::ZERO,
        )
        .await;

        for _ in 0..200 {
            if submitter.calls.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(*submitter.calls.lock().unwrap(), vec!["S1", "S2"]);
        let job = state.get(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
    }

    fn app_config(vars: &'static [(&'static str, &'static str)]) -> AppConfig {
        AppConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    async fn start(
        config: AppConfig,
        shipments: Vec<Shipment>,
    ) -> (StatusCode, actix_web::web::Bytes) {
        let (tx, _rx) = mpsc::channel(8);
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(JobsState::new(tx)))
                .app_data(web::Data::new(config))
                .service(configure_routes()),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/api/submissions/start")
            .set_json(StartSubmissionRequest { shipments })
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let status = resp.status();
        (status, actix_test::read_body(resp).await)
    }

    #[actix_web::test]
    async fn start_refuses_invalid_batches() {
        let (status, body) = start(app_config(&[]), vec![shipment("S1"), shipment("S1")]).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let report: ValidationReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.messages, vec!["Duplicate shipment IDs found: S1"]);
    }

    #[actix_web::test]
    async fn start_fails_fast_without_credentials() {
        let (status, body) = start(
            app_config(&[("CLIMATIQ_API_KEY", "secret")]),
            vec![shipment("S1")],
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            ConfigurationError::MissingBaseUrl.to_string().as_bytes()
        );
    }
}
