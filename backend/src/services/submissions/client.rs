//! Single-shipment submission to the Climatiq intermodal freight endpoint.

use crate::config::SubmissionConfig;
use async_trait::async_trait;
use freight_common::model::shipment::Shipment;
use serde_json::{json, Value};
use thiserror::Error;

const INTERMODAL_PATH: &str = "freight/v2/intermodal";

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Shipment {0} is not ready for submission: {1}")]
    InvalidShipment(String, String),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Sends one shipment to an emissions API and returns a human-readable result.
#[async_trait]
pub trait ShipmentSubmitter: Send + Sync {
    async fn submit(&self, shipment: &Shipment) -> Result<String, SubmissionError>;
}

pub struct ClimatiqClient {
    client: reqwest::Client,
    config: SubmissionConfig,
}

impl ClimatiqClient {
    pub fn new(config: SubmissionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        if self.config.base_url.ends_with('/') {
            format!("{}{}", self.config.base_url, INTERMODAL_PATH)
        } else {
            format!("{}/{}", self.config.base_url, INTERMODAL_PATH)
        }
    }
}

/// Builds the intermodal request: origin, one leg in the shipment's mode,
/// destination, and the cargo weight in kilograms.
pub fn request_body(shipment: &Shipment) -> Result<Value, SubmissionError> {
    let invalid = |reason: &str| {
        SubmissionError::InvalidShipment(shipment.shipment_id.clone(), reason.to_string())
    };

    let mode = shipment
        .transport_mode()
        .ok_or_else(|| invalid("missing transport mode"))?;
    let weight = shipment
        .weight_kg
        .as_ref()
        .map(|w| w.as_number())
        .ok_or_else(|| invalid("missing weight"))?;
    if !weight.is_finite() {
        return Err(invalid("weight is not a finite number"));
    }
    if weight < 0.0 {
        return Err(invalid("weight is negative"));
    }

    Ok(json!({
        "route": [
            { "location": { "query": shipment.origin_address } },
            { "transport_mode": mode.as_str() },
            { "location": { "query": shipment.destination_address } }
        ],
        "cargo": {
            "weight": weight,
            "weight_unit": "kg"
        }
    }))
}

/// Formats the emissions figure from a successful response, e.g. `"812.4 kg"`.
pub fn summarize_response(body: &Value) -> Result<String, SubmissionError> {
    let co2e = body["co2e"]
        .as_f64()
        .ok_or_else(|| SubmissionError::InvalidResponse("missing co2e".to_string()))?;
    let unit = body["co2e_unit"].as_str().unwrap_or("kg");
    Ok(format!("{} {}", co2e, unit))
}

#[async_trait]
impl ShipmentSubmitter for ClimatiqClient {
    async fn submit(&self, shipment: &Shipment) -> Result<String, SubmissionError> {
        let body = request_body(shipment)?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SubmissionError::Api { status, body });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?;
        summarize_response(&json)
    }
}
