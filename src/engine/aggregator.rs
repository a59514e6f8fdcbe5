// ==========================================
// 模切机生产记录系统 - 记录聚合器
// ==========================================
// 职责: 按日期/机器类型分组求和，为目标分配提供输入
// 红线: 只读，不修改记录；过滤均为线性扫描
// ==========================================

use crate::domain::record::ShiftRecord;
use crate::domain::types::MachineType;
use crate::engine::time_math::NOMINAL_WORK_HOURS;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// 单机器类型的当日汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineSummary {
    pub setup_hours: f64,             // Σ 调机分钟 / 60
    pub remarks_deduction_hours: f64, // Σ 备注扣除
    pub worked_hours: f64,            // Σ (时长 - 午休)，不截断
    pub cut_count: u64,               // Σ 刀数
    pub overtime_hours: f64,          // Σ 加班
    pub record_count: usize,          // 记录条数（调机次数）
}

// ==========================================
// RecordAggregator - 记录聚合器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordAggregator;

impl RecordAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 按开机日期分组（组内保持原始插入顺序）
    pub fn group_by_date<'a>(
        &self,
        records: &'a [ShiftRecord],
    ) -> BTreeMap<NaiveDate, Vec<&'a ShiftRecord>> {
        let mut groups: BTreeMap<NaiveDate, Vec<&'a ShiftRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.date).or_default().push(record);
        }
        groups
    }

    /// 汇总指定机器类型的记录
    pub fn summarize<'a, I>(&self, records: I, machine_type: MachineType) -> MachineSummary
    where
        I: IntoIterator<Item = &'a ShiftRecord>,
    {
        records
            .into_iter()
            .filter(|r| r.machine_type == machine_type)
            .fold(MachineSummary::default(), |mut acc, r| {
                acc.setup_hours += f64::from(r.setup_time_minutes) / 60.0;
                acc.remarks_deduction_hours += r.remarks_time_deduction_hours;
                acc.worked_hours += r.worked_hours();
                acc.cut_count = acc.cut_count.saturating_add(r.cuts);
                acc.overtime_hours += r.overtime_hours;
                acc.record_count += 1;
                acc
            })
    }

    /// 当日共享可用工时
    ///
    /// max(0, 8 - Σ调机小时 - Σ备注扣除)，两种机器合并计算
    pub fn total_available_hours<'a, I>(&self, records: I) -> f64
    where
        I: IntoIterator<Item = &'a ShiftRecord>,
    {
        let (setup_hours, deduction_hours) =
            records
                .into_iter()
                .fold((0.0, 0.0), |(setup, deduction), r| {
                    (
                        setup + f64::from(r.setup_time_minutes) / 60.0,
                        deduction + r.remarks_time_deduction_hours,
                    )
                });
        (NOMINAL_WORK_HOURS - setup_hours - deduction_hours).max(0.0)
    }

    /// 两种机器合计实际工作小时
    pub fn total_worked_hours<'a, I>(&self, records: I) -> f64
    where
        I: IntoIterator<Item = &'a ShiftRecord>,
    {
        records.into_iter().map(ShiftRecord::worked_hours).sum()
    }

    /// 按月份过滤
    pub fn filter_by_month<'a>(
        &self,
        records: &'a [ShiftRecord],
        year: i32,
        month: u32,
    ) -> Vec<&'a ShiftRecord> {
        records.iter().filter(|r| r.in_month(year, month)).collect()
    }

    /// 按机器类型过滤
    pub fn filter_by_machine<'a>(
        &self,
        records: &'a [ShiftRecord],
        machine_type: MachineType,
    ) -> Vec<&'a ShiftRecord> {
        records
            .iter()
            .filter(|r| r.machine_type == machine_type)
            .collect()
    }
}
