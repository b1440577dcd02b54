//! Batch validation for shipment rows.
//!
//! `validate_shipments` is a pure function over the whole batch. Callers run
//! it again after every accepted edit instead of patching a previous report.

use crate::model::report::{ShipmentField, ValidationReport};
use crate::model::shipment::{Shipment, TransportMode};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Returns every ID that occurs more than once, in order of first appearance.
/// Empty IDs are ignored.
pub fn find_duplicate_ids<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen = Vec::new();

    for id in ids.into_iter().filter(|id| !id.is_empty()) {
        let count = counts.entry(id).or_insert(0);
        if *count == 0 {
            first_seen.push(id);
        }
        *count += 1;
    }

    first_seen
        .into_iter()
        .filter(|id| counts[id] > 1)
        .map(str::to_string)
        .collect()
}

fn valid_modes() -> String {
    TransportMode::ALL
        .iter()
        .map(TransportMode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validates a complete batch.
///
/// Produces one batch-level message for duplicated IDs (every row carrying a
/// duplicated ID is flagged on `shipment_id`), followed by per-row messages
/// for unknown modes and for weights that are not a number >= 0. Row numbers
/// in messages are 1-based positions in `shipments`.
pub fn validate_shipments(shipments: &[Shipment]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let duplicates = find_duplicate_ids(shipments.iter().map(|s| s.shipment_id.as_str()));
    if !duplicates.is_empty() {
        report
            .messages
            .push(format!("Duplicate shipment IDs found: {}", duplicates.join(", ")));
    }
    let duplicates: HashSet<&str> = duplicates.iter().map(String::as_str).collect();

    for (index, shipment) in shipments.iter().enumerate() {
        let row_num = index + 1;
        let mut row_errors = BTreeSet::new();

        if duplicates.contains(shipment.shipment_id.as_str()) {
            row_errors.insert(ShipmentField::ShipmentId);
        }

        if let Some(mode) = shipment.mode.as_deref().filter(|m| !m.is_empty()) {
            if mode.parse::<TransportMode>().is_err() {
                row_errors.insert(ShipmentField::Mode);
                report.messages.push(format!(
                    "Row {}: Invalid mode \"{}\". Must be one of: {}",
                    row_num,
                    mode,
                    valid_modes()
                ));
            }
        }

        if let Some(weight) = &shipment.weight_kg {
            let value = weight.as_number();
            if value.is_nan() || value < 0.0 {
                row_errors.insert(ShipmentField::WeightKg);
                report.messages.push(format!(
                    "Row {}: Invalid weight \"{}\". Must be a number >= 0.0",
                    row_num, weight
                ));
            }
        }

        if !row_errors.is_empty() {
            report.field_errors.insert(index, row_errors);
        }
    }

    report
}
