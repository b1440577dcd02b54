pub mod csv;
pub mod report;
pub mod shipment;
pub mod submission;
