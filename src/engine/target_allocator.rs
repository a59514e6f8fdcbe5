// ==========================================
// 模切机生产记录系统 - 日目标分配引擎
// ==========================================
// 职责: 当日共享可用工时按实际工作小时比例分配给各机器类型，
//       扣除调机惩罚后换算为刀数目标
// 输入: 当日记录 + 设置快照
// 输出: 各机器类型目标刀数、完成率
// ==========================================

use crate::config::Settings;
use crate::domain::record::ShiftRecord;
use crate::domain::types::MachineType;
use crate::engine::aggregator::{MachineSummary, RecordAggregator};
use serde::Serialize;
use tracing::{debug, instrument};

/// 单机器类型的当日分配结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineAllocation {
    pub machine_type: MachineType,
    pub summary: MachineSummary,
    pub allocated_hours: f64,  // 分配到的可用工时（扣调机惩罚前）
    pub target_cuts: f64,      // 目标刀数（可为小数）
    pub actual_cuts: u64,      // 实际刀数
    pub difference: f64,       // 实际 - 目标
    pub completion_pct: f64,   // 完成率（目标为 0 时记 0）
}

/// 当日分配结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAllocation {
    pub total_available_hours: f64,
    pub total_worked_hours: f64,
    pub machines: Vec<MachineAllocation>, // 固定顺序：圆模、平压
}

impl DayAllocation {
    /// 按机器类型取分配结果
    pub fn get(&self, machine_type: MachineType) -> Option<&MachineAllocation> {
        self.machines.iter().find(|m| m.machine_type == machine_type)
    }
}

// ==========================================
// TargetAllocator - 日目标分配引擎
// ==========================================
pub struct TargetAllocator<'a> {
    settings: &'a Settings,
    aggregator: RecordAggregator,
}

impl<'a> TargetAllocator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            aggregator: RecordAggregator::new(),
        }
    }

    /// 机器类型分到的可用工时
    ///
    /// - 两类合计工作小时 > 0：T × a / (a + b)
    /// - 否则平分：T / 2
    pub fn machine_available_hours(
        &self,
        same_type_worked_hours: f64,
        total_available_hours: f64,
        total_worked_hours: f64,
    ) -> f64 {
        if total_worked_hours > 0.0 {
            total_available_hours * (same_type_worked_hours / total_worked_hours)
        } else {
            total_available_hours / 2.0
        }
    }

    /// 计算机器类型的日目标刀数
    ///
    /// target = max(0, 分配工时 - K × 当日该类型记录数) × G
    ///
    /// # 参数
    /// - `day_records`: 当日全部记录（两种机器）
    /// - `total_available_hours`: 当日共享可用工时
    /// - `total_worked_hours`: 两种机器合计工作小时
    pub fn daily_target(
        &self,
        machine_type: MachineType,
        day_records: &[&ShiftRecord],
        total_available_hours: f64,
        total_worked_hours: f64,
    ) -> f64 {
        let summary = self
            .aggregator
            .summarize(day_records.iter().copied(), machine_type);
        self.target_from_summary(machine_type, &summary, total_available_hours, total_worked_hours)
            .1
    }

    /// 计算当日两种机器的完整分配
    #[instrument(skip(self, day_records), fields(records = day_records.len()))]
    pub fn allocate_day(&self, day_records: &[&ShiftRecord]) -> DayAllocation {
        let total_available_hours = self
            .aggregator
            .total_available_hours(day_records.iter().copied());
        let total_worked_hours = self
            .aggregator
            .total_worked_hours(day_records.iter().copied());

        let machines = MachineType::ALL
            .iter()
            .map(|&machine_type| {
                let summary = self
                    .aggregator
                    .summarize(day_records.iter().copied(), machine_type);
                let (allocated_hours, target_cuts) = self.target_from_summary(
                    machine_type,
                    &summary,
                    total_available_hours,
                    total_worked_hours,
                );
                let actual = summary.cut_count as f64;

                MachineAllocation {
                    machine_type,
                    summary,
                    allocated_hours,
                    target_cuts,
                    actual_cuts: summary.cut_count,
                    difference: actual - target_cuts,
                    completion_pct: completion_percentage(actual, target_cuts),
                }
            })
            .collect();

        DayAllocation {
            total_available_hours,
            total_worked_hours,
            machines,
        }
    }

    fn target_from_summary(
        &self,
        machine_type: MachineType,
        summary: &MachineSummary,
        total_available_hours: f64,
        total_worked_hours: f64,
    ) -> (f64, f64) {
        let penalty = self.settings.setup_penalty(machine_type);
        let rate = self.settings.hourly_rate(machine_type);

        let allocated = self.machine_available_hours(
            summary.worked_hours,
            total_available_hours,
            total_worked_hours,
        );
        let net_hours = (allocated - penalty * summary.record_count as f64).max(0.0);
        let target = net_hours * rate;

        debug!(
            machine_type = %machine_type,
            allocated_hours = allocated,
            setup_events = summary.record_count,
            target_cuts = target,
            "日目标计算"
        );

        (allocated, target)
    }
}

/// 完成率（%）
///
/// 目标 <= 0 或结果非有限数时返回 0
pub fn completion_percentage(actual: f64, target: f64) -> f64 {
    if target > 0.0 {
        let pct = actual / target * 100.0;
        if pct.is_finite() {
            return pct;
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_available_hours_even_split_without_worked_hours() {
        let settings = Settings::default();
        let allocator = TargetAllocator::new(&settings);
        assert_eq!(allocator.machine_available_hours(0.0, 6.0, 0.0), 3.0);
        assert_eq!(allocator.machine_available_hours(0.0, 6.0, -0.5), 3.0);
    }

    #[test]
    fn test_machine_available_hours_proportional() {
        let settings = Settings::default();
        let allocator = TargetAllocator::new(&settings);
        let a = allocator.machine_available_hours(3.0, 8.0, 4.0);
        let b = allocator.machine_available_hours(1.0, 8.0, 4.0);
        assert!((a - 6.0).abs() < 1e-9);
        assert!((a + b - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(500.0, 1000.0), 50.0);
        assert_eq!(completion_percentage(500.0, 0.0), 0.0);
        assert_eq!(completion_percentage(0.0, 0.0), 0.0);
        assert!(completion_percentage(f64::MAX, f64::MIN_POSITIVE).is_finite());
    }

    #[test]
    fn test_empty_day() {
        let settings = Settings::default();
        let allocation = TargetAllocator::new(&settings).allocate_day(&[]);
        assert_eq!(allocation.total_available_hours, 8.0);
        // 无工作小时 → 各分一半，且无调机惩罚
        let circle = allocation.get(MachineType::Circle).unwrap();
        assert_eq!(circle.allocated_hours, 4.0);
        assert_eq!(circle.target_cuts, 4.0 * 6250.0);
        assert_eq!(circle.actual_cuts, 0);
        assert_eq!(circle.completion_pct, 0.0);
    }
}
