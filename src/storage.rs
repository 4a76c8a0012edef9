use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::cache::{CacheError, ScheduleStore, StoredSchedule};

const RECORD_FILE: &str = "menu_cache.json";

/// 把缓存记录保存为目录下的单个 JSON 文件
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, CacheError> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn record_path(&self) -> PathBuf {
        self.base_path.join(RECORD_FILE)
    }
}

#[async_trait]
impl ScheduleStore for FileStore {
    async fn get(&self) -> Result<Option<StoredSchedule>, CacheError> {
        let path = self.record_path();
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };
        debug!("Read {} bytes from {:?}", data.len(), path);
        Ok(Some(serde_json::from_slice(&data)?))
    }

    async fn put(&self, record: &StoredSchedule) -> Result<(), CacheError> {
        let path = self.record_path();
        let data = serde_json::to_vec(record)?;

        // 先写临时文件再改名，避免留下半截记录
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &data).await?;
        fs::rename(&tmp_path, &path).await?;
        debug!("Persisted {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(self.record_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(e)),
        }
    }
}
