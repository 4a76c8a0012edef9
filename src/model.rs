use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::day_key::parse_day_key;
use crate::meal::MealSlot;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule contains no days")]
    Empty,

    #[error("no day key could be parsed as a date (keys: {0:?})")]
    NoDatedEntries(Vec<String>),
}

/// 某一天的三餐菜单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMenu {
    #[serde(rename = "Breakfast")]
    pub breakfast: String,
    #[serde(rename = "Lunch")]
    pub lunch: String,
    #[serde(rename = "Dinner")]
    pub dinner: String,
}

impl DayMenu {
    pub fn dish(&self, slot: MealSlot) -> &str {
        match slot {
            MealSlot::Breakfast | MealSlot::UpcomingBreakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }
}

/// 一周菜单，键为日期键（见 [`crate::day_key`]）
///
/// 线上格式为 `{ "menu": { "Monday 17.03.25": { "Breakfast": ..., ... } } }`，
/// 持久化时使用同一格式。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(rename = "menu")]
    pub days: BTreeMap<String, DayMenu>,
}

impl WeeklySchedule {
    pub fn new(days: BTreeMap<String, DayMenu>) -> Self {
        Self { days }
    }

    pub fn get(&self, key: &str) -> Option<&DayMenu> {
        self.days.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.days.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// 所有可解析日期键中最晚的日期
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().filter_map(|key| parse_day_key(key)).max()
    }

    /// 校验菜单至少包含一个可解析的日期键，返回最晚日期
    pub fn validate(&self) -> Result<NaiveDate, ScheduleError> {
        if self.days.is_empty() {
            return Err(ScheduleError::Empty);
        }

        for key in self.days.keys() {
            if parse_day_key(key).is_none() {
                warn!("Ignoring unparseable day key: {:?}", key);
            }
        }

        self.last_date()
            .ok_or_else(|| ScheduleError::NoDatedEntries(self.days.keys().cloned().collect()))
    }
}
