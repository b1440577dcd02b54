use crate::model::csv::RawRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Transport modes accepted for a freight leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Air,
    Sea,
    Road,
    Rail,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Air,
        TransportMode::Sea,
        TransportMode::Road,
        TransportMode::Rail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Air => "air",
            TransportMode::Sea => "sea",
            TransportMode::Road => "road",
            TransportMode::Rail => "rail",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transport mode \"{0}\"")]
pub struct UnknownTransportMode(pub String);

impl FromStr for TransportMode {
    type Err = UnknownTransportMode;

    /// Matching is exact: `"Air"` is not a valid mode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransportMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownTransportMode(s.to_string()))
    }
}

/// Per-row state of the submission stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    #[default]
    Pending,
    Success,
    Error,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::Pending => "pending",
            ProgressStatus::Success => "success",
            ProgressStatus::Error => "error",
        }
    }
}

/// A weight as it arrives from either side of the pipeline.
///
/// Values read from a file are text; the grid's number editor sends JSON
/// numbers. Both are kept verbatim so an invalid entry can be echoed back in
/// its validation message and corrected in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeightKg {
    Number(f64),
    Text(String),
}

impl WeightKg {
    /// Loose numeric coercion. Text is trimmed, blank text counts as zero,
    /// `Infinity` is recognised, and anything that is not a plain decimal
    /// literal yields NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            WeightKg::Number(value) => *value,
            WeightKg::Text(text) => coerce_text(text),
        }
    }
}

impl fmt::Display for WeightKg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightKg::Number(value) => write!(f, "{}", value),
            WeightKg::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for WeightKg {
    fn from(value: f64) -> Self {
        WeightKg::Number(value)
    }
}

impl From<&str> for WeightKg {
    fn from(value: &str) -> Self {
        WeightKg::Text(value.to_string())
    }
}

fn coerce_text(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(value) = parse_radix_literal(s) {
        return value;
    }
    // `str::parse` also accepts "inf" and "nan"; those are not numbers here.
    if s.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Unsigned `0x`, `0o` and `0b` literals. A prefix with no valid digits is NaN.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN);
    Some(value)
}

/// A freight shipment row as loaded into the grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    #[serde(default)]
    pub shipment_id: String,
    #[serde(default)]
    pub origin_address: String,
    #[serde(default)]
    pub destination_address: String,
    /// Raw mode text; see [`Shipment::transport_mode`] for the typed value.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<WeightKg>,
    #[serde(default)]
    pub progress_status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
}

impl Shipment {
    /// Maps a parsed CSV line onto a shipment.
    ///
    /// Columns are looked up by title; a missing `shipment_id` or address
    /// becomes an empty string, a missing `mode` or `weight_kg` stays `None`.
    /// Submission fields always start out pending and empty.
    pub fn from_raw(record: &RawRecord) -> Self {
        Shipment {
            shipment_id: record.get("shipment_id").unwrap_or_default().to_string(),
            origin_address: record.get("origin_address").unwrap_or_default().to_string(),
            destination_address: record
                .get("destination_address")
                .unwrap_or_default()
                .to_string(),
            mode: record.get("mode").map(str::to_string),
            weight_kg: record.get("weight_kg").map(WeightKg::from),
            progress_status: ProgressStatus::Pending,
            error_message: None,
            results: None,
        }
    }

    pub fn transport_mode(&self) -> Option<TransportMode> {
        self.mode.as_deref().and_then(|m| m.parse().ok())
    }
}
