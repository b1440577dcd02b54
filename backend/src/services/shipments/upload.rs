use crate::config::AppConfig;
use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse, Responder};
use freight_common::model::shipment::Shipment;
use freight_common::parser::{parse_csv, ParseError};
use freight_common::responses::UploadResponse;
use freight_common::validation::validate_shipments;
use futures_util::StreamExt;
use log::{error, info, warn};
use std::string::FromUtf8Error;
use thiserror::Error;

/// Shown for any structural problem in the file; the detail goes to the log.
pub const PARSE_FAILURE_MESSAGE: &str = "An error occurred while parsing the CSV file.";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please upload a valid CSV file.")]
    NotCsv,
    #[error("Missing file")]
    MissingFile,
    #[error("An error occurred while reading the CSV file.")]
    Multipart(#[from] MultipartError),
    #[error("An error occurred while reading the CSV file.")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// HTTP handler wrapper that converts the upload result into an `HttpResponse`.
///
/// - On success: `200 OK` with an `UploadResponse` as JSON.
/// - On a rejected or unreadable upload: `400 Bad Request` with the reason.
/// - On a malformed file: `400 Bad Request` with `PARSE_FAILURE_MESSAGE`.
pub async fn process(payload: Multipart, config: web::Data<AppConfig>) -> impl Responder {
    let text = match read_csv_upload(payload).await {
        Ok(text) => text,
        Err(e) => {
            warn!("File upload rejected: {:?}", e);
            return HttpResponse::BadRequest().body(e.to_string());
        }
    };

    match ingest_csv(&text, config.max_rows) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            error!("CSV Parsing Error: {}", e);
            HttpResponse::BadRequest().body(PARSE_FAILURE_MESSAGE)
        }
    }
}

/// Reads the `file` part of the multipart payload into a string.
///
/// Other parts are drained and ignored. The file name must end in `.csv`.
pub async fn read_csv_upload(mut payload: Multipart) -> Result<String, UploadError> {
    let mut contents: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if name.as_deref() == Some("file") {
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                .unwrap_or_default();

            if !filename.ends_with(".csv") {
                return Err(UploadError::NotCsv);
            }

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                bytes.extend_from_slice(&chunk?);
            }
            contents = Some(bytes);
        } else {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
        }
    }

    let bytes = contents.ok_or(UploadError::MissingFile)?;
    Ok(String::from_utf8(bytes)?)
}

/// Runs the full ingestion pipeline over uploaded text: parse, map, validate.
pub fn ingest_csv(text: &str, max_rows: usize) -> Result<UploadResponse, ParseError> {
    let records = parse_csv(text, max_rows)?;
    let shipments: Vec<Shipment> = records.iter().map(Shipment::from_raw).collect();
    let report = validate_shipments(&shipments);

    info!(
        "Parsed {} shipments ({} validation messages)",
        shipments.len(),
        report.messages.len()
    );

    Ok(UploadResponse { shipments, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::shipments::configure_routes;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, App};
    use freight_common::model::report::ShipmentField;

    const BOUNDARY: &str = "----freight-test-boundary";

    fn multipart_body(filename: &str, contents: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = contents
        )
    }

    fn test_config(max_rows: usize) -> AppConfig {
        let mut config = AppConfig::from_lookup(|_| None).unwrap();
        config.max_rows = max_rows;
        config
    }

    async fn upload(filename: &str, contents: &str, max_rows: usize) -> (StatusCode, Vec<u8>) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(test_config(max_rows)))
                .service(configure_routes()),
        )
        .await;
        let req = actix_test::TestRequest::post()
            .uri("/api/shipments/upload")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(filename, contents))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        let status = resp.status();
        let body = actix_test::read_body(resp).await;
        (status, body.to_vec())
    }

    #[test]
    fn ingest_maps_and_validates() {
        let text = "shipment_id,origin_address,destination_address,mode,weight_kg\n\
                    S1,\"Hamburg, DE\",Oslo,sea,1200\n\
                    S1,Lyon,Paris,truck,-4\n";
        let response = ingest_csv(text, 100).unwrap();

        assert_eq!(response.shipments.len(), 2);
        assert_eq!(response.shipments[0].origin_address, "Hamburg, DE");
        assert_eq!(response.report.messages.len(), 3);
        assert!(response.report.has_error(0, ShipmentField::ShipmentId));
        assert!(response.report.has_error(1, ShipmentField::Mode));
        assert!(response.report.has_error(1, ShipmentField::WeightKg));
    }

    #[test]
    fn ingest_propagates_parse_errors() {
        assert_eq!(ingest_csv(" \n", 100).unwrap_err(), ParseError::EmptyInput);
        assert_eq!(
            ingest_csv("a,b\n1\n", 100).unwrap_err(),
            ParseError::ColumnCountMismatch { row: 1 }
        );
    }

    #[actix_web::test]
    async fn upload_returns_rows_and_report() {
        let csv = "shipment_id,origin_address,destination_address,mode,weight_kg\n\
                   S1,Rotterdam,Shanghai,sea,1000\n\
                   S2,Madrid,Lisbon,road,20\n\
                   S3,Oslo,Bergen,rail,5";
        let (status, body) = upload("batch.csv", csv, 2).await;

        assert_eq!(status, StatusCode::OK);
        let response: UploadResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.shipments.len(), 2);
        assert_eq!(response.shipments[1].shipment_id, "S2");
        assert!(response.report.is_empty());
    }

    #[actix_web::test]
    async fn upload_rejects_other_extensions() {
        let (status, body) = upload("batch.xlsx", "a,b\n1,2", 100).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Please upload a valid CSV file.");
    }

    #[actix_web::test]
    async fn malformed_file_gets_generic_notice() {
        let (status, body) = upload("batch.csv", "a,b\n1,2,3", 100).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, PARSE_FAILURE_MESSAGE.as_bytes());
    }
}
