// ==========================================
// 模切机生产记录系统 - 记录构建器
// ==========================================
// 职责: 校验通过的录入 + 设置快照 → 完整 ShiftRecord
//       导入/历史记录归一化（缺省补齐 + 派生字段重算）
// 红线: 派生字段只依赖记录自身字段与午休快照
// ==========================================

use crate::config::settings::DEFAULT_LUNCH_BREAK_MINUTES;
use crate::config::Settings;
use crate::domain::record::{value_as_f64, RawShiftRecord, ShiftRecord, ValidatedEntry};
use crate::domain::timestamp::parse_timestamp;
use crate::domain::types::{MachineType, RecordId};
use crate::engine::time_math::{
    compute_effective_work_time, compute_overtime, compute_work_duration,
    extract_remark_time_deduction, TimeMathError, TimeMathResult,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::{debug, instrument};

/// 归一化失败原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("缺少必填字段（id / machineType / productName / startTime / endTime / cuts）")]
    MissingRequiredField,

    #[error("未知机器类型: {0}")]
    UnknownMachineType(String),

    #[error("无效的时间格式: {0}")]
    InvalidTimestamp(String),

    #[error("记录编号已用尽")]
    SequenceExhausted,

    #[error(transparent)]
    TimeMath(#[from] TimeMathError),
}

// ==========================================
// RecordBuilder - 记录构建器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder;

impl RecordBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 新建记录
    ///
    /// # 参数
    /// - `entry`: 校验通过的录入数据
    /// - `settings`: 当前设置（取午休分钟数作为快照）
    /// - `id` / `sequence_number` / `created_at`: 由调用方分配
    #[instrument(skip(self, entry, settings), fields(machine_type = %entry.machine_type))]
    pub fn build(
        &self,
        entry: &ValidatedEntry,
        settings: &Settings,
        id: RecordId,
        sequence_number: u64,
        created_at: DateTime<Utc>,
    ) -> TimeMathResult<ShiftRecord> {
        self.derive(
            id,
            sequence_number,
            entry.machine_type,
            entry.product_name.clone(),
            entry.start_time,
            entry.end_time,
            entry.setup_time_minutes,
            entry.cuts,
            entry.completed_per_cut,
            entry.remarks.clone(),
            created_at,
            settings.lunch_break_minutes,
        )
    }

    /// 编辑记录：保留 id / 编号 / 创建时间 / 午休快照，其余按新录入重算
    pub fn rebuild(&self, existing: &ShiftRecord, entry: &ValidatedEntry) -> TimeMathResult<ShiftRecord> {
        self.derive(
            existing.id.clone(),
            existing.sequence_number,
            entry.machine_type,
            entry.product_name.clone(),
            entry.start_time,
            entry.end_time,
            entry.setup_time_minutes,
            entry.cuts,
            entry.completed_per_cut,
            entry.remarks.clone(),
            existing.created_at,
            existing.lunch_break_minutes,
        )
    }

    /// 归一化宽松记录（导入文件 / 旧版本存储）
    ///
    /// 缺省规则：
    /// - setupTime 缺失或非法 → 0；cuts 为 null 或非法 → 0
    /// - completedPerCut 缺失或 < 1 → 1
    /// - lunchBreakMinutes 缺失 → 30
    /// - recordNumber 缺失或超出范围 → 调用 `next_sequence` 分配（返回 None 表示编号用尽）
    /// - createdAt 缺失或非法 → `now`
    ///
    /// # 返回
    /// - Err(MissingRequiredField): 必填字段缺失
    /// - Err(UnknownMachineType / InvalidTimestamp / TimeMath): 字段无法解释
    /// - Err(SequenceExhausted): 需要分配编号但计数器已到上限
    pub fn normalize<F>(
        &self,
        raw: &RawShiftRecord,
        now: DateTime<Utc>,
        mut next_sequence: F,
    ) -> Result<ShiftRecord, NormalizeError>
    where
        F: FnMut() -> Option<u64>,
    {
        if !raw.has_required_fields() {
            return Err(NormalizeError::MissingRequiredField);
        }
        let id = raw.id_text().ok_or(NormalizeError::MissingRequiredField)?;

        let machine_raw = raw.machine_type.as_deref().unwrap_or_default();
        let machine_type = machine_raw
            .parse::<MachineType>()
            .map_err(|_| NormalizeError::UnknownMachineType(machine_raw.to_string()))?;

        let start_time = parse_required_timestamp(raw.start_time.as_deref())?;
        let end_time = parse_required_timestamp(raw.end_time.as_deref())?;

        let setup_time_minutes = raw
            .setup_time
            .as_ref()
            .and_then(value_as_f64)
            .map(|v| v.max(0.0).trunc() as u32)
            .unwrap_or(0);
        let cuts = raw
            .cuts
            .as_ref()
            .and_then(value_as_f64)
            .map(|v| v.max(0.0).trunc() as u64)
            .unwrap_or(0);
        let completed_per_cut = raw
            .completed_per_cut
            .as_ref()
            .and_then(value_as_f64)
            .map(|v| v.trunc())
            .filter(|v| *v >= 1.0)
            .map(|v| v as u32)
            .unwrap_or(1);
        let lunch_break_minutes = raw
            .lunch_break_minutes
            .as_ref()
            .and_then(value_as_f64)
            .map(|v| v.max(0.0).trunc() as u32)
            .unwrap_or(DEFAULT_LUNCH_BREAK_MINUTES);

        let sequence_number = match raw.record_number() {
            Some(number) => number,
            None => next_sequence().ok_or(NormalizeError::SequenceExhausted)?,
        };

        let created_at = raw
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or(now);

        let record = self.derive(
            RecordId(id),
            sequence_number,
            machine_type,
            raw.product_name.clone().unwrap_or_default(),
            start_time,
            end_time,
            setup_time_minutes,
            cuts,
            completed_per_cut,
            raw.remarks.clone().unwrap_or_default(),
            created_at,
            lunch_break_minutes,
        )?;
        Ok(record)
    }

    // ==========================================
    // 派生字段计算
    // ==========================================

    #[allow(clippy::too_many_arguments)]
    fn derive(
        &self,
        id: RecordId,
        sequence_number: u64,
        machine_type: MachineType,
        product_name: String,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        setup_time_minutes: u32,
        cuts: u64,
        completed_per_cut: u32,
        remarks: String,
        created_at: DateTime<Utc>,
        lunch_break_minutes: u32,
    ) -> TimeMathResult<ShiftRecord> {
        let work_duration_hours = compute_work_duration(start_time, end_time)?;
        let remarks_time_deduction_hours =
            extract_remark_time_deduction(Some(&remarks), machine_type);

        let record = ShiftRecord {
            id,
            sequence_number,
            machine_type,
            product_name,
            start_time,
            end_time,
            setup_time_minutes,
            cuts,
            completed_per_cut,
            remarks,
            date: start_time.date(),
            created_at,
            lunch_break_minutes,
            work_duration_hours,
            effective_work_time_hours: compute_effective_work_time(
                work_duration_hours,
                lunch_break_minutes,
            ),
            remarks_time_deduction_hours,
            setup_time_hours: f64::from(setup_time_minutes) / 60.0,
            overtime_hours: compute_overtime(work_duration_hours, lunch_break_minutes),
        };

        debug!(
            id = %record.id,
            work_duration_hours = record.work_duration_hours,
            overtime_hours = record.overtime_hours,
            remarks_deduction = record.remarks_time_deduction_hours,
            "记录派生字段计算完成"
        );

        Ok(record)
    }
}

fn parse_required_timestamp(text: Option<&str>) -> Result<NaiveDateTime, NormalizeError> {
    let text = text.unwrap_or_default();
    parse_timestamp(text).ok_or_else(|| NormalizeError::InvalidTimestamp(text.to_string()))
}
