use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::model::ScheduleError;
use crate::network::FetchError;
use crate::scheduler::{SchedulerError, WakeError};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    #[error("Wake error: {0}")]
    Wake(#[from] WakeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
