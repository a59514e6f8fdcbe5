// ==========================================
// 模切机生产记录系统 - 应用层
// ==========================================
// 职责: 连接命令行入口与后端 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
