use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::clock::TimeOfDay;
use crate::meal::MealCutoffs;
use crate::scheduler::{SchedulerError, TriggerSchedule};

pub const DEFAULT_ENDPOINT: &str = "https://jportal2-0.vercel.app/mess_menu.json";

/// 库和宿主程序的日志都打开到 info
pub const DEFAULT_LOG_FILTER: &str = "mess_menu_widget=info,menu_widget_host=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid endpoint {0:?}: {1}")]
    Endpoint(String, String),

    #[error("Meal cutoffs must be strictly increasing: {0:?}")]
    Cutoffs(MealCutoffs),

    #[error("Invalid trigger schedule: {0}")]
    Triggers(#[from] SchedulerError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub store_dir: PathBuf,
    pub log_filter: String,
    pub meals: MealCutoffs,
    pub triggers: Vec<TimeOfDay>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // 首先尝试从环境变量指定的文件加载
        if let Ok(config_path) = std::env::var("CONFIG_PATH") {
            return Self::from_file(config_path);
        }

        // 否则使用默认配置
        Ok(Self::default())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::Endpoint(self.endpoint.clone(), e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Endpoint(
                self.endpoint.clone(),
                format!("unsupported scheme {}", endpoint.scheme()),
            ));
        }

        if !self.meals.is_ordered() {
            return Err(ConfigError::Cutoffs(self.meals));
        }

        self.trigger_schedule()?;
        Ok(())
    }

    pub fn trigger_schedule(&self) -> Result<TriggerSchedule, SchedulerError> {
        TriggerSchedule::new(self.triggers.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            store_dir: "./cache/menu".into(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            meals: MealCutoffs::default(),
            triggers: TriggerSchedule::default().times().to_vec(),
        }
    }
}
