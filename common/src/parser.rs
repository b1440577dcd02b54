//! Minimal CSV reader for shipment uploads.
//!
//! The grammar is deliberately small: fields are separated by commas, a `"`
//! toggles quoted mode (inside which commas are literal) and is itself dropped,
//! and every field is trimmed. There is no `""` escape and no support for
//! newlines inside a quoted field. The header line is split on plain commas.

use crate::model::csv::RawRecord;
use log::debug;
use thiserror::Error;

/// Number of data rows read from an upload unless configured otherwise.
pub const DEFAULT_MAX_ROWS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("CSV data is empty.")]
    EmptyInput,
    /// `row` is 1-based, counted over non-blank lines after the header.
    #[error("Row {row} has a different number of columns than the header.")]
    ColumnCountMismatch { row: usize },
}

/// Splits one data line into trimmed fields, honouring quoted commas.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Parses `text` into at most `max_rows` records.
///
/// Blank lines are skipped wherever they appear and do not count towards row
/// numbers. Rows past `max_rows` are dropped without error. A row whose field
/// count differs from the header aborts the whole parse.
pub fn parse_csv(text: &str, max_rows: usize) -> Result<Vec<RawRecord>, ParseError> {
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());

    let header_line = lines.next().ok_or(ParseError::EmptyInput)?;
    let titles: Vec<&str> = header_line.split(',').map(str::trim).collect();

    let mut records = Vec::new();
    for (idx, line) in lines.take(max_rows).enumerate() {
        let row = idx + 1;
        let values = parse_csv_line(line);
        if values.len() != titles.len() {
            return Err(ParseError::ColumnCountMismatch { row });
        }

        let mut values = values.into_iter();
        let record: RawRecord = titles
            .iter()
            .map(|title| (*title, values.next().unwrap_or_default()))
            .collect();
        debug!("Parsed row {}: {:?}", row, record);
        records.push(record);
    }

    Ok(records)
}
