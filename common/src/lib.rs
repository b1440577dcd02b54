//! Shared shipment models and the CSV ingestion pipeline.
//!
//! Everything in this crate is pure and synchronous so it can run on the
//! server and in a browser grid alike: `parser` turns raw file text into
//! [`model::csv::RawRecord`]s, `model::shipment` maps those onto typed
//! shipments, and `validation` produces the report that drives cell
//! highlighting and the submit gate.

pub mod jobs;
pub mod model;
pub mod parser;
pub mod requests;
pub mod responses;
pub mod validation;
