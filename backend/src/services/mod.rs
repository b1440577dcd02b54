pub mod shipments;
pub mod submissions;
