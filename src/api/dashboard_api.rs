// ==========================================
// 模切机生产记录系统 - 看板 API
// ==========================================
// 职责: 今日概览、今日记录卡片、历史记录（按日分组）
// 架构: 只读视图，基于 ProductionApi 的记录与设置计算
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::api::production_api::ProductionApi;
use crate::config::Settings;
use crate::domain::record::ShiftRecord;
use crate::domain::timestamp;
use crate::domain::types::{MachineType, ProgressLevel, RecordId};
use crate::engine::aggregator::RecordAggregator;
use crate::engine::target_allocator::{completion_percentage, TargetAllocator};

// ===== 进度条阈值（%）=====
const OVERVIEW_DANGER_BELOW: f64 = 25.0;
const OVERVIEW_WARNING_BELOW: f64 = 40.0;
const CARD_DANGER_BELOW: f64 = 50.0;
const CARD_WARNING_BELOW: f64 = 80.0;

// ==========================================
// 视图模型
// ==========================================

/// 今日概览：单机器类型
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineOverview {
    pub machine_type: MachineType,
    pub record_count: usize,
    pub total_cuts: u64,
    pub progress_pct: f64,
    pub level: ProgressLevel,
}

/// 今日概览
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayOverview {
    pub date: NaiveDate,
    pub nominal_target: f64, // workHours × (圆模产能 + 平压产能)
    pub machines: Vec<MachineOverview>,
    pub total_cuts: u64,
    pub total_overtime_hours: f64,
}

/// 今日记录卡片
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCard {
    pub id: RecordId,
    pub sequence_number: u64,
    pub product_name: String,
    pub machine_type: MachineType,
    #[serde(with = "timestamp::serde_form")]
    pub start_time: NaiveDateTime,
    #[serde(with = "timestamp::serde_form")]
    pub end_time: NaiveDateTime,
    pub cuts: u64,
    pub finished_units: u64,
    pub setup_time_minutes: u32,
    pub overtime_hours: f64,
    pub daily_target: f64,
    pub completion_pct: f64,
    pub level: ProgressLevel,
    pub remarks: String,
}

/// 历史筛选条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub machine_type: Option<MachineType>,
    pub month: Option<(i32, u32)>,
}

impl HistoryFilter {
    /// 解析月份筛选 "YYYY-MM"
    pub fn parse_month(text: &str) -> ApiResult<(i32, u32)> {
        let invalid = || ApiError::InvalidInput(format!("无效的月份: {}（格式 YYYY-MM）", text));

        let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok((year, month))
    }
}

/// 历史：单日单机器类型对比
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMachineStat {
    pub machine_type: MachineType,
    pub record_count: usize,
    pub target_cuts: f64,
    pub actual_cuts: u64,
    pub difference: f64,
}

/// 历史：单日分组
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDay {
    pub date: NaiveDate,
    pub total_cuts: u64,
    pub total_overtime_hours: f64,
    pub machines: Vec<HistoryMachineStat>, // 仅包含当日有记录的机器类型
    pub records: Vec<ShiftRecord>,
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi<'a> {
    records: &'a [ShiftRecord],
    settings: &'a Settings,
    aggregator: RecordAggregator,
}

impl<'a> DashboardApi<'a> {
    pub fn new(production: &'a ProductionApi) -> Self {
        Self::from_parts(production.records(), production.settings())
    }

    pub fn from_parts(records: &'a [ShiftRecord], settings: &'a Settings) -> Self {
        Self {
            records,
            settings,
            aggregator: RecordAggregator::new(),
        }
    }

    fn records_on(&self, date: NaiveDate) -> Vec<&'a ShiftRecord> {
        self.records.iter().filter(|r| r.date == date).collect()
    }

    /// 今日概览
    ///
    /// 进度 = 该类型今日刀数 / (workHours × (圆模产能 + 平压产能))
    pub fn today_overview(&self, today: NaiveDate) -> TodayOverview {
        let day_records = self.records_on(today);
        let nominal_target = self.settings.work_hours_per_day
            * (self.settings.circle_hourly_rate + self.settings.flat_hourly_rate);

        let machines: Vec<MachineOverview> = MachineType::ALL
            .iter()
            .map(|&machine_type| {
                let summary = self
                    .aggregator
                    .summarize(day_records.iter().copied(), machine_type);
                let progress_pct = completion_percentage(summary.cut_count as f64, nominal_target);
                MachineOverview {
                    machine_type,
                    record_count: summary.record_count,
                    total_cuts: summary.cut_count,
                    progress_pct,
                    level: ProgressLevel::classify(
                        progress_pct,
                        OVERVIEW_DANGER_BELOW,
                        OVERVIEW_WARNING_BELOW,
                    ),
                }
            })
            .collect();

        TodayOverview {
            date: today,
            nominal_target,
            total_cuts: machines
                .iter()
                .map(|m| m.total_cuts)
                .fold(0, u64::saturating_add),
            total_overtime_hours: day_records.iter().map(|r| r.overtime_hours).sum(),
            machines,
        }
    }

    /// 今日记录卡片（插入顺序）
    ///
    /// 完成率 = 单条刀数 / 该类型当日目标
    pub fn today_record_cards(&self, today: NaiveDate) -> Vec<RecordCard> {
        let day_records = self.records_on(today);
        if day_records.is_empty() {
            return Vec::new();
        }

        let allocation = TargetAllocator::new(self.settings).allocate_day(&day_records);
        debug!(
            date = %today,
            available_hours = allocation.total_available_hours,
            "今日目标分配完成"
        );

        day_records
            .iter()
            .map(|record| {
                let daily_target = allocation
                    .get(record.machine_type)
                    .map(|m| m.target_cuts)
                    .unwrap_or(0.0);
                let completion_pct = completion_percentage(record.cuts as f64, daily_target);
                RecordCard {
                    id: record.id.clone(),
                    sequence_number: record.sequence_number,
                    product_name: record.product_name.clone(),
                    machine_type: record.machine_type,
                    start_time: record.start_time,
                    end_time: record.end_time,
                    cuts: record.cuts,
                    finished_units: record.finished_units(),
                    setup_time_minutes: record.setup_time_minutes,
                    overtime_hours: record.overtime_hours,
                    daily_target,
                    completion_pct,
                    level: ProgressLevel::classify(
                        completion_pct,
                        CARD_DANGER_BELOW,
                        CARD_WARNING_BELOW,
                    ),
                    remarks: record.remarks.clone(),
                }
            })
            .collect()
    }

    /// 历史记录（按日期降序）
    ///
    /// 目标在筛选后的当日记录上计算：按机器类型筛选时，
    /// 另一类型的工作小时与调机不参与分配
    pub fn history(&self, filter: &HistoryFilter) -> Vec<HistoryDay> {
        let filtered: Vec<ShiftRecord> = self
            .records
            .iter()
            .filter(|r| filter.machine_type.map_or(true, |m| r.machine_type == m))
            .filter(|r| filter.month.map_or(true, |(y, m)| r.in_month(y, m)))
            .cloned()
            .collect();

        let allocator = TargetAllocator::new(self.settings);
        self.aggregator
            .group_by_date(&filtered)
            .into_iter()
            .rev()
            .map(|(date, day_records)| {
                let allocation = allocator.allocate_day(&day_records);
                let machines = allocation
                    .machines
                    .iter()
                    .filter(|m| m.summary.record_count > 0)
                    .map(|m| HistoryMachineStat {
                        machine_type: m.machine_type,
                        record_count: m.summary.record_count,
                        target_cuts: m.target_cuts,
                        actual_cuts: m.actual_cuts,
                        difference: m.difference,
                    })
                    .collect();

                HistoryDay {
                    date,
                    total_cuts: day_records
                        .iter()
                        .map(|r| r.cuts)
                        .fold(0, u64::saturating_add),
                    total_overtime_hours: day_records.iter().map(|r| r.overtime_hours).sum(),
                    machines,
                    records: day_records.into_iter().cloned().collect(),
                }
            })
            .collect()
    }
}

// ==========================================
// 数值格式化
// ==========================================

/// 保留两位小数；非有限数显示为 0.00
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    format!("{:.2}", value)
}

/// 四舍五入取整后保留两位小数；非有限数显示为 0.00
pub fn format_integer(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    format!("{:.2}", value.round())
}
