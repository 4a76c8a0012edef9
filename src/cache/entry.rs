use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};

use crate::day_key::day_key;
use crate::model::WeeklySchedule;

use super::error::CacheError;

/// 缓存中的一周菜单及其过期时刻
///
/// 过期时刻总是由菜单数据推导，不能单独设置。
#[derive(Debug, Clone)]
pub struct CacheEntry {
    schedule: WeeklySchedule,
    expires_at: DateTime<Local>,
}

impl CacheEntry {
    pub fn new(schedule: WeeklySchedule) -> Result<Self, CacheError> {
        let last_date = schedule.validate()?;
        Ok(Self {
            schedule,
            expires_at: end_of_day(last_date),
        })
    }

    /// 从持久化记录恢复；记录中的过期时刻必须与数据一致
    pub(crate) fn restore(schedule: WeeklySchedule, expires_at_ms: i64) -> Result<Self, CacheError> {
        let entry = Self::new(schedule)?;
        if entry.expires_at.timestamp_millis() != expires_at_ms {
            return Err(CacheError::InvalidExpiry(expires_at_ms));
        }
        Ok(entry)
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    pub fn expires_at(&self) -> DateTime<Local> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Local>) -> bool {
        now >= self.expires_at
    }

    pub fn has_day(&self, today: NaiveDate) -> bool {
        self.schedule.contains(&day_key(today, 0))
    }
}

const LAST_MILLI_OF_DAY: NaiveTime = match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
    Some(time) => time,
    None => panic!("23:59:59.999 out of range"),
};

/// 本地时间当天的 23:59:59.999
pub fn end_of_day(date: NaiveDate) -> DateTime<Local> {
    end_of_day_in(date, &Local)
}

/// 指定时区中当天的 23:59:59.999
///
/// 夏令时重叠时取较晚的时刻；该本地时间不存在时按 UTC 解释。
pub fn end_of_day_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let last_instant = date.and_time(LAST_MILLI_OF_DAY);
    tz.from_local_datetime(&last_instant)
        .latest()
        .unwrap_or_else(|| tz.from_utc_datetime(&last_instant))
}
