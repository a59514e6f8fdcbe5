// ==========================================
// 模切机生产记录系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite（本地键值存储）
// 系统定位: 班次生产记录、日目标分配与加班统计
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 计算规则
pub mod engine;

// 配置层 - 系统设置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 命令行集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MachineType, ProgressLevel, RecordId};

// 领域实体
pub use domain::{RawShiftRecord, ShiftEntryDraft, ShiftRecord, ValidatedEntry};

// 配置
pub use config::Settings;

// 引擎
pub use engine::{RecordAggregator, RecordBuilder, RecordValidator, TargetAllocator};

// API
pub use api::{ApiError, ApiResult, DashboardApi, ProductionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "模切机生产记录系统";
