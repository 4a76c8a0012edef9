use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::error::CacheError;

/// 持久化的缓存记录：序列化后的菜单 JSON 与过期时刻（毫秒时间戳）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSchedule {
    pub schedule_json: String,
    pub expires_at_ms: i64,
}

/// 菜单缓存的持久化后端，只用于进程重启后的预热
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get(&self) -> Result<Option<StoredSchedule>, CacheError>;

    async fn put(&self, record: &StoredSchedule) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;
}

/// 纯内存实现，用于测试或不需要持久化的宿主
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<Option<StoredSchedule>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: StoredSchedule) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    pub async fn snapshot(&self) -> Option<StoredSchedule> {
        self.record.lock().await.clone()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn get(&self) -> Result<Option<StoredSchedule>, CacheError> {
        Ok(self.record.lock().await.clone())
    }

    async fn put(&self, record: &StoredSchedule) -> Result<(), CacheError> {
        *self.record.lock().await = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.record.lock().await.take();
        Ok(())
    }
}
