// ==========================================
// 模切机生产记录系统 - 应用状态
// ==========================================
// 职责: 打开本地存储并持有生产记录 API 实例
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::api::{ApiError, DashboardApi, ProductionApi};
use crate::config::DB_PATH_ENV;
use crate::repository::{ProductionRepository, SqliteKvStore};

/// 应用状态
///
/// 命令行入口持有唯一实例；所有写操作经由 `production`
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 生产记录API
    pub production: ProductionApi,
}

impl AppState {
    /// 打开指定路径的数据库并加载全部状态
    pub fn new(db_path: String) -> Result<Self, ApiError> {
        info!(db_path = %db_path, "初始化应用状态");

        let store = SqliteKvStore::new(&db_path)?;
        let repo = ProductionRepository::new(Arc::new(store));
        let production = ProductionApi::open(repo)?;

        info!(
            records = production.records().len(),
            "应用状态初始化完成"
        );
        Ok(Self { db_path, production })
    }

    /// 看板视图（借用当前记录与设置）
    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(&self.production)
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 DIECUT_TRACKER_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./diecut_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("diecut-tracker");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("diecut_tracker.db");
        }
    }

    path.to_string_lossy().to_string()
}
