use crate::model::report::ValidationReport;
use crate::model::shipment::Shipment;
use serde::{Deserialize, Serialize};

/// Returned by the upload endpoint: the parsed batch plus its first report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub shipments: Vec<Shipment>,
    pub report: ValidationReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateShipmentsResponse {
    /// `false` when the edited column is not one the validator looks at.
    pub revalidated: bool,
    pub report: Option<ValidationReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSubmissionResponse {
    pub job_id: String,
}
