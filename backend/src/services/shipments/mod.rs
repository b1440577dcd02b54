//! Shipment ingestion endpoints: uploading a CSV batch and re-validating it
//! after grid edits.
//!
//! The provided routes are:
//! - `POST /api/shipments/upload`: multipart/form-data upload with a `file`
//!   field. The file is parsed (at most `AppConfig::max_rows` data rows),
//!   mapped onto shipments and validated. Responds with the rows and their
//!   `ValidationReport`, or with a generic error notice when the file is
//!   malformed.
//!
//! - `POST /api/shipments/validate`: receives the complete current batch after
//!   a cell edit and returns a freshly computed report. Edits to columns the
//!   validator does not inspect are acknowledged without revalidation.

use actix_web::web::{post, scope};
use actix_web::Scope;

pub(crate) mod upload;
mod validate;

const API_PATH: &str = "/api/shipments";

/// Configures and returns the Actix scope for shipment routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Route to upload and validate a new CSV batch.
        .route("/upload", post().to(upload::process))
        // Route to revalidate the batch after an edit.
        .route("/validate", post().to(validate::process))
}
