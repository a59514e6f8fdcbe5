// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供临时数据库、内存存储 API、录入表单与记录构造
// ==========================================

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use diecut_tracker::api::ProductionApi;
use diecut_tracker::config::Settings;
use diecut_tracker::domain::{RecordId, ShiftEntryDraft, ShiftRecord};
use diecut_tracker::engine::{RecordBuilder, RecordValidator};
use diecut_tracker::repository::MemoryStore;
use tempfile::TempDir;

/// 创建临时数据库路径
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db_path() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("无法创建临时目录");
    let db_path = dir
        .path()
        .join("diecut_tracker_test.db")
        .to_string_lossy()
        .to_string();
    (dir, db_path)
}

/// 基于内存存储的 API（返回存储句柄以便调整容量上限）
pub fn memory_api() -> (Arc<MemoryStore>, ProductionApi) {
    let store = Arc::new(MemoryStore::new());
    let api = ProductionApi::with_store(store.clone()).expect("无法打开内存存储");
    (store, api)
}

/// 构造录入表单（每刀完成数 1，无备注）
pub fn draft(
    machine_type: &str,
    product_name: &str,
    start_time: &str,
    end_time: &str,
    setup_minutes: u32,
    cuts: u64,
) -> ShiftEntryDraft {
    ShiftEntryDraft {
        machine_type: machine_type.to_string(),
        product_name: product_name.to_string(),
        start_time: start_time.to_string(),
        end_time: end_time.to_string(),
        setup_time_minutes: setup_minutes.to_string(),
        cuts: cuts.to_string(),
        completed_per_cut: "1".to_string(),
        remarks: String::new(),
    }
}

/// 直接构造记录（不经过持久化）
pub fn build_record(draft: &ShiftEntryDraft, settings: &Settings, sequence_number: u64) -> ShiftRecord {
    let entry = RecordValidator::new()
        .parse(draft)
        .expect("测试表单应通过校验");
    RecordBuilder::new()
        .build(
            &entry,
            settings,
            RecordId::generate(),
            sequence_number,
            Utc.with_ymd_and_hms(2025, 3, 14, 18, 0, 0).unwrap(),
        )
        .expect("测试记录应可构建")
}

/// 参考场景：圆模 08:00–16:30 调机 30 分钟，平压 08:00–16:00 调机 20 分钟
pub fn reference_day_drafts() -> Vec<ShiftEntryDraft> {
    vec![
        draft("circle", "彩盒A", "2025-03-14T08:00", "2025-03-14T16:30", 30, 20_000),
        draft("flat", "彩盒B", "2025-03-14T08:00", "2025-03-14T16:00", 20, 38_000),
    ]
}
