// ==========================================
// 模切机生产记录系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod record;
pub mod timestamp;
pub mod types;

// 重导出核心类型
pub use record::{RawShiftRecord, ShiftEntryDraft, ShiftRecord, ValidatedEntry};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use types::{MachineType, ProgressLevel, RecordId};
