// ==========================================
// 模切机生产记录系统 - 引擎层
// ==========================================
// 职责: 时间计算、录入校验、记录构建、聚合与日目标分配
// 红线: 引擎均为纯计算，不读写存储；设置由调用方传入
// ==========================================

pub mod aggregator;
pub mod record_builder;
pub mod target_allocator;
pub mod time_math;
pub mod validator;

// 重导出核心引擎
pub use aggregator::{MachineSummary, RecordAggregator};
pub use record_builder::{NormalizeError, RecordBuilder};
pub use target_allocator::{completion_percentage, DayAllocation, MachineAllocation, TargetAllocator};
pub use time_math::{
    compute_effective_work_time, compute_overtime, compute_work_duration,
    extract_remark_time_deduction, TimeMathError, TimeMathResult, NOMINAL_WORK_HOURS,
};
pub use validator::{EntryViolation, RecordValidator};
