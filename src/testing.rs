//! 单元测试共用的内存替身

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use hyper::StatusCode;

use crate::cache::{CacheError, ScheduleStore, StoredSchedule};
use crate::clock::Clock;
use crate::day_key::format_day_key;
use crate::model::{DayMenu, WeeklySchedule};
use crate::network::{FetchError, MenuFetcher};
use crate::scheduler::{WakeError, WakeFacility};
use crate::widget::DisplaySurface;

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .earliest()
        .unwrap()
}

/// 菜单文字里带上日期键，便于断言展示的是哪一天
pub fn day_menu(date: NaiveDate) -> DayMenu {
    let key = format_day_key(date);
    DayMenu {
        breakfast: format!("{key} breakfast"),
        lunch: format!("{key} lunch"),
        dinner: format!("{key} dinner"),
    }
}

pub fn schedule_for(dates: &[NaiveDate]) -> WeeklySchedule {
    WeeklySchedule::new(
        dates
            .iter()
            .map(|date| (format_day_key(*date), day_menu(*date)))
            .collect(),
    )
}

pub struct FailingStore;

#[async_trait]
impl ScheduleStore for FailingStore {
    async fn get(&self) -> Result<Option<StoredSchedule>, CacheError> {
        Err(CacheError::Store("disk unavailable".into()))
    }

    async fn put(&self, _record: &StoredSchedule) -> Result<(), CacheError> {
        Err(CacheError::Store("disk unavailable".into()))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::Store("disk unavailable".into()))
    }
}

pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}

/// 按顺序返回预设结果；用完后一律返回 503
#[derive(Default)]
pub struct ScriptedFetcher {
    results: Mutex<VecDeque<Result<WeeklySchedule, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(results: Vec<Result<WeeklySchedule, FetchError>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MenuFetcher for ScriptedFetcher {
    async fn fetch(&self) -> Result<WeeklySchedule, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)))
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    renders: Mutex<Vec<(String, String)>>,
}

impl RecordingDisplay {
    pub fn renders(&self) -> Vec<(String, String)> {
        self.renders.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(String, String)> {
        self.renders.lock().unwrap().last().cloned()
    }
}

impl DisplaySurface for RecordingDisplay {
    fn render(&self, meal_label: &str, menu_text: &str) {
        self.renders
            .lock()
            .unwrap()
            .push((meal_label.to_string(), menu_text.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeCall {
    Exact(u32, DateTime<Local>),
    Inexact(u32, DateTime<Local>),
    Cancel(u32),
}

/// 记录成功的唤醒注册；`deny_exact` 模拟宿主拒绝精确唤醒权限
pub struct RecordingWakeFacility {
    allow_exact: bool,
    deny_exact: bool,
    calls: Mutex<Vec<WakeCall>>,
}

impl RecordingWakeFacility {
    pub fn new(allow_exact: bool, deny_exact: bool) -> Self {
        Self {
            allow_exact,
            deny_exact,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<WakeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl WakeFacility for RecordingWakeFacility {
    fn can_schedule_exact(&self) -> bool {
        self.allow_exact
    }

    fn schedule_exact(&self, key: u32, at: DateTime<Local>) -> Result<(), WakeError> {
        if self.deny_exact {
            return Err(WakeError::PermissionDenied);
        }
        self.calls.lock().unwrap().push(WakeCall::Exact(key, at));
        Ok(())
    }

    fn schedule_inexact(&self, key: u32, at: DateTime<Local>) -> Result<(), WakeError> {
        self.calls.lock().unwrap().push(WakeCall::Inexact(key, at));
        Ok(())
    }

    fn cancel(&self, key: u32) {
        self.calls.lock().unwrap().push(WakeCall::Cancel(key));
    }
}
