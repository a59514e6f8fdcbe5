// ==========================================
// 模切机生产记录系统 - 配置层
// ==========================================
// 职责: 全局设置定义与校验
// 存储: 本地键值存储 "settings"
// ==========================================

pub mod settings;

// 重导出核心配置类型
pub use settings::{Settings, SettingsViolation};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "DIECUT_TRACKER_DB_PATH";
