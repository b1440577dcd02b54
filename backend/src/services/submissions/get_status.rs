use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    get_submission_status(&job_id, &state).await
}

async fn get_submission_status(job_id: &str, state: &JobsState) -> HttpResponse {
    match state.get(job_id).await {
        Some(job) => HttpResponse::Ok().json(job),
        None => HttpResponse::NotFound().body("Job ID not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freight_common::jobs::JobStatus;
    use freight_common::model::submission::SubmissionJob;
    use tokio::sync::mpsc;

    #[actix_web::test]
    async fn reports_known_jobs() {
        let (tx, _rx) = mpsc::channel(1);
        let state = JobsState::new(tx);
        state.register(SubmissionJob::new("job-1", Vec::new())).await;

        let resp = get_submission_status("job-1", &state).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let job: SubmissionJob = serde_json::from_slice(&body).unwrap();
        assert_eq!(job.status, JobStatus::Pending);

        let missing = get_submission_status("nope", &state).await;
        assert_eq!(missing.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
