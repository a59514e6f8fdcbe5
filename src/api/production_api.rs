// ==========================================
// 模切机生产记录系统 - 生产记录 API
// ==========================================
// 职责: 记录增删改、设置保存、导入导出
// 状态: 记录集合 / 设置 / 编号计数器 由本结构唯一持有
// 红线: 先改内存再持久化；写入失败回滚内存并返回 PersistenceError
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::Settings;
use crate::domain::record::{RawShiftRecord, ShiftRecord, MAX_RECORD_NUMBER};
use crate::domain::types::RecordId;
use crate::engine::record_builder::RecordBuilder;
use crate::engine::validator::RecordValidator;
use crate::repository::{KeyValueStore, ProductionRepository, RepositoryResult};

mod deletion;
mod import_export;
mod records;
mod settings_ops;

pub use deletion::{DeletePlan, DeleteScope};
pub use import_export::{export_file_name, ExportDocument, ImportSummary, EXPORT_VERSION};

/// 持久化目标键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StorageKey {
    Records,
    Counter,
    Settings,
}

/// 变更前的内存状态（用于回滚）
#[derive(Debug, Clone)]
struct StateSnapshot {
    records: Vec<ShiftRecord>,
    settings: Settings,
    record_counter: u64,
}

// ==========================================
// ProductionApi - 生产记录 API
// ==========================================
pub struct ProductionApi {
    repo: ProductionRepository,
    records: Vec<ShiftRecord>,
    settings: Settings,
    record_counter: u64,
    validator: RecordValidator,
    builder: RecordBuilder,
}

impl ProductionApi {
    /// 从存储加载状态
    ///
    /// - 设置：存储值覆盖默认值
    /// - 记录：逐条归一化（缺省补齐、派生字段重算），无法解释的记录丢弃并告警
    /// - 计数器：max(存储计数器, 记录最大编号)
    pub fn open(repo: ProductionRepository) -> ApiResult<Self> {
        let settings = repo.load_settings()?;
        let stored_counter = repo.load_counter()?;
        let raw_records = repo.load_records()?;

        let builder = RecordBuilder::new();
        let (records, record_counter) = normalize_loaded(&builder, &raw_records, stored_counter);

        if records.len() != raw_records.len() {
            warn!(
                loaded = records.len(),
                stored = raw_records.len(),
                "部分存储记录无法解释，已忽略"
            );
        }
        info!(
            records = records.len(),
            record_counter = record_counter,
            "生产数据加载完成"
        );

        Ok(Self {
            repo,
            records,
            settings,
            record_counter,
            validator: RecordValidator::new(),
            builder,
        })
    }

    /// 使用指定键值存储打开
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> ApiResult<Self> {
        Self::open(ProductionRepository::new(store))
    }

    // ==========================================
    // 只读访问
    // ==========================================

    /// 全部记录（插入顺序）
    pub fn records(&self) -> &[ShiftRecord] {
        &self.records
    }

    /// 当前设置
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 已发放的最大编号
    pub fn record_counter(&self) -> u64 {
        self.record_counter
    }

    /// 按ID查询记录
    pub fn get_record(&self, id: &RecordId) -> ApiResult<&ShiftRecord> {
        self.records
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("记录(id={})不存在", id)))
    }

    // ==========================================
    // 内部：快照与提交
    // ==========================================

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            records: self.records.clone(),
            settings: self.settings.clone(),
            record_counter: self.record_counter,
        }
    }

    fn write_keys(&self, keys: &[StorageKey]) -> RepositoryResult<()> {
        for key in keys {
            match key {
                StorageKey::Records => self.repo.save_records(&self.records)?,
                StorageKey::Counter => self.repo.save_counter(self.record_counter)?,
                StorageKey::Settings => self.repo.save_settings(&self.settings)?,
            }
        }
        Ok(())
    }

    /// 持久化当前内存状态；失败时回滚到 previous
    fn commit(&mut self, previous: StateSnapshot, keys: &[StorageKey]) -> ApiResult<()> {
        let Err(err) = self.write_keys(keys) else {
            return Ok(());
        };

        warn!(error = %err, "持久化失败，回滚内存状态");
        self.records = previous.records;
        self.settings = previous.settings;
        self.record_counter = previous.record_counter;

        // 已写入的键恢复为旧值
        if let Err(restore_err) = self.write_keys(keys) {
            warn!(error = %restore_err, "存储恢复失败，存储内容可能与内存不一致");
        }

        Err(err.into())
    }
}

/// 下一个记录编号；超过 MAX_RECORD_NUMBER 时返回 None
fn next_record_number(current: u64) -> Option<u64> {
    current.checked_add(1).filter(|n| *n <= MAX_RECORD_NUMBER)
}

/// 归一化存储记录并计算计数器
fn normalize_loaded(
    builder: &RecordBuilder,
    raw_records: &[RawShiftRecord],
    stored_counter: u64,
) -> (Vec<ShiftRecord>, u64) {
    let now = Utc::now();
    let max_stored_number = raw_records
        .iter()
        .filter_map(RawShiftRecord::record_number)
        .max()
        .unwrap_or(0);

    let mut counter = stored_counter.max(max_stored_number);
    let mut records = Vec::with_capacity(raw_records.len());
    for raw in raw_records {
        let result = builder.normalize(raw, now, || {
            counter = next_record_number(counter)?;
            Some(counter)
        });
        match result {
            Ok(record) => records.push(record),
            Err(e) => warn!(id = ?raw.id_text(), error = %e, "忽略无法解释的存储记录"),
        }
    }

    (records, counter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryStore, RECORDS_KEY};

    #[test]
    fn test_open_normalizes_legacy_records() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_item(
                RECORDS_KEY,
                r#"[
                    {"id":"a","recordNumber":3,"machineType":"circle","productName":"P","startTime":"2025-03-14T08:00","endTime":"2025-03-14T16:30","setupTime":30,"cuts":100},
                    {"id":"b","machineType":"flat","productName":"Q","startTime":"2025-03-14T08:00","endTime":"2025-03-14T16:00","cuts":50},
                    {"id":"c","machineType":"laser","productName":"R","startTime":"2025-03-14T08:00","endTime":"2025-03-14T16:00","cuts":1}
                ]"#,
            )
            .unwrap();

        let api = ProductionApi::with_store(store).unwrap();
        assert_eq!(api.records().len(), 2);
        assert_eq!(api.records()[0].sequence_number, 3);
        assert_eq!(api.records()[1].sequence_number, 4);
        assert_eq!(api.records()[1].lunch_break_minutes, 30);
        assert_eq!(api.record_counter(), 4);
    }

    #[test]
    fn test_get_record_not_found() {
        let api = ProductionApi::with_store(Arc::new(MemoryStore::new())).unwrap();
        assert!(matches!(
            api.get_record(&RecordId::from("missing")),
            Err(ApiError::NotFound(_))
        ));
    }
}
