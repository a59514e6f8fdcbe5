// ==========================================
// 模切机生产记录系统 - API 层
// ==========================================
// 职责: 持有记录集合与设置，提供录入、删除、设置、导入导出与看板接口
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod production_api;

// 重导出核心类型
pub use dashboard_api::{
    format_integer, format_number, DashboardApi, HistoryDay, HistoryFilter, HistoryMachineStat,
    MachineOverview, RecordCard, TodayOverview,
};
pub use error::{ApiError, ApiResult};
pub use production_api::{
    export_file_name, DeletePlan, DeleteScope, ExportDocument, ImportSummary, ProductionApi,
    EXPORT_VERSION,
};
