use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Local, TimeZone};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::TimeOfDay;
use crate::dispatch::{EventSender, WidgetEvent};

/// 唯一一个待触发唤醒请求的标识
pub const WAKE_REQUEST_KEY: u32 = 999;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WakeError {
    #[error("exact wake scheduling not permitted")]
    PermissionDenied,

    #[error("wake facility unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("trigger schedule is empty")]
    EmptySchedule,

    #[error("invalid trigger time {0}")]
    InvalidTime(TimeOfDay),

    #[error("no trigger instant found after {0}")]
    NoNextTrigger(DateTime<Local>),

    #[error("wake registration failed: {0}")]
    Wake(#[from] WakeError),
}

/// 每天固定的刷新时刻，按时间排序且不重复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSchedule {
    times: Vec<TimeOfDay>,
}

impl TriggerSchedule {
    pub fn new(mut times: Vec<TimeOfDay>) -> Result<Self, SchedulerError> {
        if let Some(bad) = times.iter().find(|time| !time.is_valid()) {
            return Err(SchedulerError::InvalidTime(*bad));
        }
        times.sort();
        times.dedup();
        if times.is_empty() {
            return Err(SchedulerError::EmptySchedule);
        }
        Ok(Self { times })
    }

    pub fn times(&self) -> &[TimeOfDay] {
        &self.times
    }

    /// 严格晚于 `now` 的最早触发时刻；今天的都已过去则取明天第一个
    pub fn next_after(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        self.next_after_in(&now)
    }

    /// 按 `now` 所在时区计算下一次触发
    ///
    /// 落在夏令时跳变空档里的时刻会被跳过；重复出现的时刻取较早的一次。
    pub fn next_after_in<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = now.timezone();
        let today = now.date_naive();
        (0..=2)
            .map(|offset| today + ChronoDuration::days(offset))
            .flat_map(|date| {
                let tz = tz.clone();
                self.times.iter().filter_map(move |time| {
                    let naive = date.and_time(time.to_naive_time()?);
                    tz.from_local_datetime(&naive).earliest()
                })
            })
            .find(|candidate| candidate > now)
    }
}

impl Default for TriggerSchedule {
    fn default() -> Self {
        Self {
            times: vec![
                TimeOfDay::new(0, 0),
                TimeOfDay::new(9, 30),
                TimeOfDay::new(14, 0),
                TimeOfDay::new(21, 30),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakePrecision {
    Exact,
    Inexact,
}

/// 宿主提供的“在 T 时刻唤醒我”的能力
///
/// 同一个 `key` 的新请求会替换旧请求。
pub trait WakeFacility: Send + Sync {
    fn can_schedule_exact(&self) -> bool;

    fn schedule_exact(&self, key: u32, at: DateTime<Local>) -> Result<(), WakeError>;

    fn schedule_inexact(&self, key: u32, at: DateTime<Local>) -> Result<(), WakeError>;

    fn cancel(&self, key: u32);
}

pub struct RefreshScheduler {
    triggers: TriggerSchedule,
    facility: Arc<dyn WakeFacility>,
    key: u32,
}

impl RefreshScheduler {
    pub fn new(triggers: TriggerSchedule, facility: Arc<dyn WakeFacility>) -> Self {
        Self {
            triggers,
            facility,
            key: WAKE_REQUEST_KEY,
        }
    }

    /// 注册下一次唤醒；不允许精确唤醒时退回到非精确注册
    pub fn schedule_next(
        &self,
        now: DateTime<Local>,
    ) -> Result<(DateTime<Local>, WakePrecision), SchedulerError> {
        let at = self
            .triggers
            .next_after(now)
            .ok_or(SchedulerError::NoNextTrigger(now))?;

        if self.facility.can_schedule_exact() {
            match self.facility.schedule_exact(self.key, at) {
                Ok(()) => {
                    info!("Next update at {} (exact)", at);
                    return Ok((at, WakePrecision::Exact));
                }
                Err(WakeError::PermissionDenied) => {
                    warn!("Exact wake permission missing, falling back to inexact");
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            debug!("Exact wakes not allowed by host");
        }

        self.facility.schedule_inexact(self.key, at)?;
        info!("Next update at {} (inexact)", at);
        Ok((at, WakePrecision::Inexact))
    }

    pub fn cancel(&self) {
        debug!("Cancelling pending wake {}", self.key);
        self.facility.cancel(self.key);
    }
}

/// 用 tokio 定时任务实现唤醒，到点后向控制线程投递 [`WidgetEvent::Wake`]
pub struct TokioWakeFacility {
    runtime: Handle,
    events: EventSender,
    pending: Mutex<HashMap<u32, JoinHandle<()>>>,
}

impl TokioWakeFacility {
    pub fn new(events: EventSender) -> Result<Self, WakeError> {
        let runtime = Handle::try_current().map_err(|e| WakeError::Unavailable(e.to_string()))?;
        Ok(Self {
            runtime,
            events,
            pending: Mutex::new(HashMap::new()),
        })
    }

    fn register(&self, key: u32, at: DateTime<Local>) {
        let delay = (at - Local::now()).to_std().unwrap_or(Duration::ZERO);
        let events = self.events.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Wake {} fired", key);
            events.send(WidgetEvent::Wake);
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.insert(key, task) {
            previous.abort();
        }
    }
}

impl WakeFacility for TokioWakeFacility {
    fn can_schedule_exact(&self) -> bool {
        true
    }

    fn schedule_exact(&self, key: u32, at: DateTime<Local>) -> Result<(), WakeError> {
        self.register(key, at);
        Ok(())
    }

    fn schedule_inexact(&self, key: u32, at: DateTime<Local>) -> Result<(), WakeError> {
        self.register(key, at);
        Ok(())
    }

    fn cancel(&self, key: u32) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = pending.remove(&key) {
            task.abort();
        }
    }
}

impl Drop for TokioWakeFacility {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, task) in pending.drain() {
            task.abort();
        }
    }
}
