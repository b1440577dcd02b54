use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    /// Percentage of rows processed so far.
    InProgress(u32),
    Completed(String),
    Failed(String),
}
