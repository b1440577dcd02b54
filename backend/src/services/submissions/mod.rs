//! Submission of validated batches to the Climatiq freight API.
//!
//! The provided routes are:
//! - `POST /api/submissions/start`: re-validates the batch, checks that the
//!   API credentials are configured and schedules a background job that
//!   submits the rows one by one. Responds with the `job_id`.
//! - `GET /api/submissions/status/{job_id}`: the `SubmissionJob`, including
//!   per-row `progress_status`, for polling.
//! - `GET /api/submissions/export/{job_id}`: the job's rows with their results
//!   as a CSV download.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

pub mod client;
mod export;
mod get_status;
pub mod start;

const API_PATH: &str = "/api/submissions";

/// Configures and returns the Actix scope for submission routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(get_status::process))
        .route("/export/{job_id}", get().to(export::process))
}
