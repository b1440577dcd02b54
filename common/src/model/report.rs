use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The shipment fields that are editable in the grid and checked by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentField {
    ShipmentId,
    Mode,
    WeightKg,
}

impl ShipmentField {
    pub const ALL: [ShipmentField; 3] = [
        ShipmentField::ShipmentId,
        ShipmentField::Mode,
        ShipmentField::WeightKg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentField::ShipmentId => "shipment_id",
            ShipmentField::Mode => "mode",
            ShipmentField::WeightKg => "weight_kg",
        }
    }

    /// Resolves a grid column id. Columns that are not validated return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        ShipmentField::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for ShipmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one validation pass over a batch.
///
/// `messages` is the flat list shown to the user. `field_errors` maps a 0-based
/// row index to the fields of that row that should be highlighted; rows without
/// errors have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub messages: Vec<String>,
    pub field_errors: BTreeMap<usize, BTreeSet<ShipmentField>>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.field_errors.is_empty()
    }

    pub fn has_error(&self, row: usize, field: ShipmentField) -> bool {
        self.field_errors
            .get(&row)
            .is_some_and(|fields| fields.contains(&field))
    }

    pub fn fields_for(&self, row: usize) -> Option<&BTreeSet<ShipmentField>> {
        self.field_errors.get(&row)
    }

    /// Submission is only allowed for a non-empty batch without any messages.
    pub fn is_ready_to_submit(&self, row_count: usize) -> bool {
        row_count > 0 && self.messages.is_empty()
    }
}
