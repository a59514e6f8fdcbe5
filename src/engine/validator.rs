// ==========================================
// 模切机生产记录系统 - 录入校验器
// ==========================================
// 职责: 校验待录入班次记录的结构与时间约束
// 红线: 收集全部违规（不提前返回），无副作用
// ==========================================

use crate::domain::record::{ShiftEntryDraft, ValidatedEntry};
use crate::domain::timestamp::parse_timestamp;
use crate::domain::types::MachineType;
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// EntryViolation - 录入违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryViolation {
    MissingMachineType,
    InvalidMachineType(String),
    MissingProductName,
    MissingStartTime,
    MissingEndTime,
    InvalidStartTime,
    InvalidEndTime,
    EndNotAfterStart,
    MissingSetupTime,
    InvalidSetupTime,
    MissingCuts,
    InvalidCuts,
    MissingCompletedPerCut,
    InvalidCompletedPerCut,
}

impl EntryViolation {
    /// 违规对应的表单字段
    pub fn field(&self) -> &'static str {
        match self {
            EntryViolation::MissingMachineType | EntryViolation::InvalidMachineType(_) => {
                "machineType"
            }
            EntryViolation::MissingProductName => "productName",
            EntryViolation::MissingStartTime | EntryViolation::InvalidStartTime => "startTime",
            EntryViolation::MissingEndTime
            | EntryViolation::InvalidEndTime
            | EntryViolation::EndNotAfterStart => "endTime",
            EntryViolation::MissingSetupTime | EntryViolation::InvalidSetupTime => "setupTime",
            EntryViolation::MissingCuts | EntryViolation::InvalidCuts => "cuts",
            EntryViolation::MissingCompletedPerCut | EntryViolation::InvalidCompletedPerCut => {
                "completedPerCut"
            }
        }
    }

    /// 本地化提示文本
    pub fn message(&self) -> String {
        match self {
            EntryViolation::MissingMachineType => t("validation.missing_machine_type"),
            EntryViolation::InvalidMachineType(value) => {
                t_with_args("validation.invalid_machine_type", &[("value", value)])
            }
            EntryViolation::MissingProductName => t("validation.missing_product_name"),
            EntryViolation::MissingStartTime => t("validation.missing_start_time"),
            EntryViolation::MissingEndTime => t("validation.missing_end_time"),
            EntryViolation::InvalidStartTime => t("validation.invalid_start_time"),
            EntryViolation::InvalidEndTime => t("validation.invalid_end_time"),
            EntryViolation::EndNotAfterStart => t("validation.end_not_after_start"),
            EntryViolation::MissingSetupTime => t("validation.missing_setup_time"),
            EntryViolation::InvalidSetupTime => t("validation.invalid_setup_time"),
            EntryViolation::MissingCuts => t("validation.missing_cuts"),
            EntryViolation::InvalidCuts => t("validation.invalid_cuts"),
            EntryViolation::MissingCompletedPerCut => t("validation.missing_completed_per_cut"),
            EntryViolation::InvalidCompletedPerCut => t("validation.invalid_completed_per_cut"),
        }
    }
}

impl fmt::Display for EntryViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field(), self.message())
    }
}

// ==========================================
// RecordValidator - 录入校验器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验录入表单
    ///
    /// 检查顺序：机器类型 → 产品名称 → 开始/结束时间（存在、可解析、先后）
    /// → 调机时间 → 刀数 → 每刀完成数
    ///
    /// # 返回
    /// 全部违规列表（为空表示通过）
    pub fn validate(&self, draft: &ShiftEntryDraft) -> Vec<EntryViolation> {
        self.parse(draft).err().unwrap_or_default()
    }

    /// 校验并转换为类型化录入数据
    ///
    /// # 返回
    /// - Ok(ValidatedEntry): 校验通过
    /// - Err(Vec<EntryViolation>): 全部违规
    pub fn parse(&self, draft: &ShiftEntryDraft) -> Result<ValidatedEntry, Vec<EntryViolation>> {
        let mut violations = Vec::new();

        // 1. 机器类型
        let machine_raw = draft.machine_type.trim();
        let machine_type = if machine_raw.is_empty() {
            violations.push(EntryViolation::MissingMachineType);
            None
        } else {
            let parsed = machine_raw.parse::<MachineType>().ok();
            if parsed.is_none() {
                violations.push(EntryViolation::InvalidMachineType(machine_raw.to_string()));
            }
            parsed
        };

        // 2. 产品名称
        let product_name = draft.product_name.trim();
        if product_name.is_empty() {
            violations.push(EntryViolation::MissingProductName);
        }

        // 3. 时间
        let start_raw = draft.start_time.trim();
        let end_raw = draft.end_time.trim();
        if start_raw.is_empty() {
            violations.push(EntryViolation::MissingStartTime);
        }
        if end_raw.is_empty() {
            violations.push(EntryViolation::MissingEndTime);
        }
        let mut interval = None;
        if !start_raw.is_empty() && !end_raw.is_empty() {
            let start = parse_timestamp(start_raw);
            let end = parse_timestamp(end_raw);
            if start.is_none() {
                violations.push(EntryViolation::InvalidStartTime);
            }
            if end.is_none() {
                violations.push(EntryViolation::InvalidEndTime);
            }
            if let (Some(start), Some(end)) = (start, end) {
                if end <= start {
                    violations.push(EntryViolation::EndNotAfterStart);
                } else {
                    interval = Some((start, end));
                }
            }
        }

        // 4. 数值字段
        let setup_time_minutes = parse_bounded::<u32>(
            &draft.setup_time_minutes,
            0,
            EntryViolation::MissingSetupTime,
            EntryViolation::InvalidSetupTime,
            &mut violations,
        );
        let cuts = parse_bounded::<u64>(
            &draft.cuts,
            0,
            EntryViolation::MissingCuts,
            EntryViolation::InvalidCuts,
            &mut violations,
        );
        let completed_per_cut = parse_bounded::<u32>(
            &draft.completed_per_cut,
            1,
            EntryViolation::MissingCompletedPerCut,
            EntryViolation::InvalidCompletedPerCut,
            &mut violations,
        );

        match (machine_type, interval, setup_time_minutes, cuts, completed_per_cut) {
            (
                Some(machine_type),
                Some((start_time, end_time)),
                Some(setup_time_minutes),
                Some(cuts),
                Some(completed_per_cut),
            ) if violations.is_empty() => Ok(ValidatedEntry {
                machine_type,
                product_name: product_name.to_string(),
                start_time,
                end_time,
                setup_time_minutes,
                cuts,
                completed_per_cut,
                remarks: draft.remarks.clone(),
            }),
            _ => Err(violations),
        }
    }
}

/// 解析带下限的整数字段，违规写入 violations
fn parse_bounded<T>(
    raw: &str,
    min: i64,
    missing: EntryViolation,
    invalid: EntryViolation,
    violations: &mut Vec<EntryViolation>,
) -> Option<T>
where
    T: TryFrom<i64>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        violations.push(missing);
        return None;
    }

    let parsed = trimmed
        .parse::<i64>()
        .ok()
        .filter(|v| *v >= min)
        .and_then(|v| T::try_from(v).ok());
    if parsed.is_none() {
        violations.push(invalid);
    }
    parsed
}
