use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::model::WeeklySchedule;

mod entry;
mod error;
mod store;

pub use entry::{end_of_day, end_of_day_in, CacheEntry};
pub use error::CacheError;
pub use store::{MemoryStore, ScheduleStore, StoredSchedule};

/// 一周菜单的内存缓存，带持久化预热
///
/// 菜单与过期时刻作为一个 [`CacheEntry`] 整体替换，读者不会看到半更新的状态。
pub struct MenuCache {
    store: Arc<dyn ScheduleStore>,
    state: RwLock<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    entry: Option<CacheEntry>,
    restore_attempted: bool,
}

impl MenuCache {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self {
            store,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// 有效条件：持有菜单、`now` 早于过期时刻、且菜单包含今天
    ///
    /// 已过期时会顺带清空内存与持久化记录。
    pub async fn is_valid(&self, now: DateTime<Local>) -> bool {
        self.restore(now).await;

        let mut state = self.state.write().await;
        let entry = match state.entry.as_ref() {
            Some(entry) => entry,
            None => {
                debug!("Cache miss: no schedule held");
                return false;
            }
        };

        if entry.is_expired(now) {
            info!("Cached schedule expired at {}", entry.expires_at());
            state.entry = None;
            self.clear_store().await;
            return false;
        }

        if !entry.has_day(now.date_naive()) {
            warn!(
                "Cached schedule has no entry for {}, treating as stale",
                now.date_naive()
            );
            return false;
        }

        debug!("Cache hit, valid until {}", entry.expires_at());
        true
    }

    /// 整体替换缓存并持久化；持久化失败只记录日志
    pub async fn set(&self, schedule: WeeklySchedule) -> Result<DateTime<Local>, CacheError> {
        let entry = CacheEntry::new(schedule)?;
        let record = StoredSchedule {
            schedule_json: serde_json::to_string(entry.schedule())?,
            expires_at_ms: entry.expires_at().timestamp_millis(),
        };
        let expires_at = entry.expires_at();

        let mut state = self.state.write().await;
        info!(
            "Caching schedule with {} days, valid until {}",
            entry.schedule().len(),
            expires_at
        );
        state.entry = Some(entry);
        state.restore_attempted = true;

        if let Err(e) = self.store.put(&record).await {
            warn!("Failed to persist schedule: {}", e);
        }

        Ok(expires_at)
    }

    /// 进程启动后首次访问时从持久化记录恢复，返回是否持有菜单
    pub async fn restore(&self, now: DateTime<Local>) -> bool {
        let mut state = self.state.write().await;
        if state.entry.is_some() || state.restore_attempted {
            return state.entry.is_some();
        }
        state.restore_attempted = true;

        let record = match self.store.get().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No persisted schedule to restore");
                return false;
            }
            Err(e) => {
                warn!("Failed to read persisted schedule: {}", e);
                return false;
            }
        };

        match Self::decode(record) {
            Ok(entry) if !entry.is_expired(now) => {
                info!("Restored persisted schedule, valid until {}", entry.expires_at());
                state.entry = Some(entry);
                true
            }
            Ok(entry) => {
                info!("Persisted schedule expired at {}, discarding", entry.expires_at());
                self.clear_store().await;
                false
            }
            Err(e) => {
                warn!("Discarding unreadable persisted schedule: {}", e);
                self.clear_store().await;
                false
            }
        }
    }

    /// 在读锁内借用当前菜单
    pub async fn read<R>(&self, f: impl FnOnce(Option<&WeeklySchedule>) -> R) -> R {
        let state = self.state.read().await;
        f(state.entry.as_ref().map(CacheEntry::schedule))
    }

    pub async fn expires_at(&self) -> Option<DateTime<Local>> {
        self.state.read().await.entry.as_ref().map(CacheEntry::expires_at)
    }

    fn decode(record: StoredSchedule) -> Result<CacheEntry, CacheError> {
        let schedule: WeeklySchedule = serde_json::from_str(&record.schedule_json)?;
        CacheEntry::restore(schedule, record.expires_at_ms)
    }

    async fn clear_store(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear persisted schedule: {}", e);
        }
    }
}
