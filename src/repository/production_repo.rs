// ==========================================
// 模切机生产记录系统 - 生产数据仓储
// ==========================================
// 职责: 记录集合 / 设置 / 编号计数器 与键值存储之间的映射
// 红线: Repository 不含业务逻辑（记录归一化由上层负责）
// 存储键: productionRecords / settings / recordCounter
// ==========================================

use crate::config::Settings;
use crate::domain::record::{RawShiftRecord, ShiftRecord, MAX_RECORD_NUMBER};
use crate::repository::error::RepositoryResult;
use crate::repository::kv_store::KeyValueStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub const RECORDS_KEY: &str = "productionRecords";
pub const SETTINGS_KEY: &str = "settings";
pub const COUNTER_KEY: &str = "recordCounter";

pub struct ProductionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ProductionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    // ==========================================
    // 记录集合
    // ==========================================

    /// 读取已存储的记录（宽松结构）
    ///
    /// - 键不存在 → 空列表
    /// - 整体不是 JSON 数组 → 记录警告并返回空列表
    /// - 单条无法解析 → 跳过并记录警告
    pub fn load_records(&self) -> RepositoryResult<Vec<RawShiftRecord>> {
        let Some(raw) = self.store.get_item(RECORDS_KEY)? else {
            return Ok(Vec::new());
        };

        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!(key = RECORDS_KEY, "存储的记录不是数组，按空集合加载");
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!(key = RECORDS_KEY, error = %e, "存储的记录无法解析，按空集合加载");
                return Ok(Vec::new());
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<RawShiftRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => warn!(index = index, error = %e, "跳过无法解析的存储记录"),
            }
        }
        Ok(records)
    }

    /// 覆盖写入记录集合
    pub fn save_records(&self, records: &[ShiftRecord]) -> RepositoryResult<()> {
        let json = serde_json::to_string(records)?;
        self.store.set_item(RECORDS_KEY, &json)
    }

    // ==========================================
    // 设置
    // ==========================================

    /// 读取设置（存储值覆盖默认值；缺失或损坏时使用默认值）
    pub fn load_settings(&self) -> RepositoryResult<Settings> {
        let Some(raw) = self.store.get_item(SETTINGS_KEY)? else {
            return Ok(Settings::default());
        };

        let merged = serde_json::from_str::<Value>(&raw)
            .and_then(|value| Settings::default().merged_with(&value));
        match merged {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(key = SETTINGS_KEY, error = %e, "存储的设置无法解析，使用默认设置");
                Ok(Settings::default())
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> RepositoryResult<()> {
        let json = serde_json::to_string(settings)?;
        self.store.set_item(SETTINGS_KEY, &json)
    }

    // ==========================================
    // 编号计数器
    // ==========================================

    /// 读取已发放的最大编号（缺失、非法或超出编号上限为 0）
    pub fn load_counter(&self) -> RepositoryResult<u64> {
        let Some(raw) = self.store.get_item(COUNTER_KEY)? else {
            return Ok(0);
        };
        match raw.trim().parse::<u64>() {
            Ok(counter) if counter <= MAX_RECORD_NUMBER => Ok(counter),
            Ok(_) => {
                warn!(key = COUNTER_KEY, value = %raw, "编号计数器超出上限，按 0 处理");
                Ok(0)
            }
            Err(e) => {
                warn!(key = COUNTER_KEY, value = %raw, error = %e, "编号计数器非法，按 0 处理");
                Ok(0)
            }
        }
    }

    pub fn save_counter(&self, counter: u64) -> RepositoryResult<()> {
        self.store.set_item(COUNTER_KEY, &counter.to_string())
    }
}
