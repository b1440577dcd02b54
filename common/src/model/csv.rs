use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One data line of an uploaded CSV file, keyed by header title.
///
/// This is the untyped stage of ingestion: every value is kept exactly as the
/// parser produced it (trimmed, quotes removed). Conversion into a typed
/// `Shipment` happens separately in `Shipment::from_raw`.
///
/// Header titles are neither validated nor deduplicated. When a header is
/// repeated, the value of the later column replaces the earlier one.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(title.into(), value.into());
    }

    /// The value stored under `title`, if the header contained that column.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.fields.get(title).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (title, value) in iter {
            record.insert(title, value);
        }
        record
    }
}
