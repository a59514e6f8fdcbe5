// ==========================================
// 模切机生产记录系统 - 本地键值存储
// ==========================================
// 职责: 定义键值存储接口（字符串键 → 字符串值）
// 实现: SqliteKvStore（持久化）/ MemoryStore（内存，可设容量上限）
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use std::collections::HashMap;
use std::sync::Mutex;

// ==========================================
// KeyValueStore Trait
// ==========================================
pub trait KeyValueStore: Send + Sync {
    /// 读取键值，不存在返回 None
    fn get_item(&self, key: &str) -> RepositoryResult<Option<String>>;

    /// 写入键值（覆盖）
    fn set_item(&self, key: &str, value: &str) -> RepositoryResult<()>;

    /// 删除键（不存在时不报错）
    fn remove_item(&self, key: &str) -> RepositoryResult<()>;
}

// ==========================================
// MemoryStore - 内存键值存储
// ==========================================
// quota 为 Some(n) 时，写入后总字节数（键 + 值）超过 n 即失败，原值保留
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryInner {
    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 带容量上限的内存存储
    pub fn with_quota(quota: usize) -> Self {
        let store = Self::default();
        store.set_quota(Some(quota));
        store
    }

    /// 调整容量上限（None 表示不限）
    pub fn set_quota(&self, quota: Option<usize>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.quota = quota;
        }
    }

    fn lock(&self) -> RepositoryResult<std::sync::MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.lock()?.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let mut inner = self.lock()?;
        if let Some(quota) = inner.quota {
            let required = inner.used_bytes_excluding(key) + key.len() + value.len();
            if required > quota {
                return Err(RepositoryError::QuotaExceeded {
                    key: key.to_string(),
                    required,
                    quota,
                });
            }
        }
        inner.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> RepositoryResult<()> {
        self.lock()?.items.remove(key);
        Ok(())
    }
}
