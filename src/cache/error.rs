use thiserror::Error;

use crate::model::ScheduleError;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),

    #[error("Invalid expiry timestamp: {0} ms")]
    InvalidExpiry(i64),

    #[error("Store error: {0}")]
    Store(String),
}
