use crate::model::shipment::Shipment;
use serde::{Deserialize, Serialize};

/// Request payload for the re-validation endpoint, sent after a grid edit.
/// Carries the complete current batch, not just the edited row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateShipmentsRequest {
    pub shipments: Vec<Shipment>,
    /// Column id of the edited cell. Absent means "always revalidate".
    #[serde(default)]
    pub changed_field: Option<String>,
}

/// Request payload for starting a submission job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSubmissionRequest {
    pub shipments: Vec<Shipment>,
}
