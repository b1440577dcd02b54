use crate::job_controller::state::JobsState;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use freight_common::model::shipment::Shipment;
use log::error;

const EXPORT_HEADER: [&str; 8] = [
    "shipment_id",
    "origin_address",
    "destination_address",
    "mode",
    "weight_kg",
    "progress_status",
    "results",
    "error_message",
];

/// `GET /api/submissions/export/{job_id}`: the job's rows as a CSV attachment.
pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    let Some(job) = state.get(&job_id).await else {
        return HttpResponse::NotFound().body("Job ID not found");
    };

    match render_csv(&job.shipments) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(format!(
                    "shipments_{}.csv",
                    job.job_id
                ))],
            })
            .body(bytes),
        Err(e) => {
            error!("Export of job {} failed: {}", job.job_id, e);
            HttpResponse::InternalServerError().body(format!("Error: {}", e))
        }
    }
}

/// Writes shipments with their submission outcome as RFC 4180 CSV.
pub fn render_csv(shipments: &[Shipment]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for s in shipments {
        let weight = s.weight_kg.as_ref().map(|w| w.to_string()).unwrap_or_default();
        writer.write_record([
            s.shipment_id.as_str(),
            s.origin_address.as_str(),
            s.destination_address.as_str(),
            s.mode.as_deref().unwrap_or_default(),
            weight.as_str(),
            s.progress_status.as_str(),
            s.results.as_deref().unwrap_or_default(),
            s.error_message.as_deref().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
