// ==========================================
// 模切机生产记录系统 - 时间计算
// ==========================================
// 职责: 工作时长、加班时长、备注时间扣除
// 红线: 纯函数，无隐藏读取（设置由调用方传入）
// ==========================================

use crate::domain::types::MachineType;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// 名义工作时长（小时）
///
/// 加班与可用工时均以固定 8 小时计算，与 Settings.work_hours_per_day 无关。
/// 若要改为读取设置，只需替换此常量的使用点。
pub const NOMINAL_WORK_HOURS: f64 = 8.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// 时间计算错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeMathError {
    #[error("无效的时间区间: start={start}, end={end}（结束时间必须晚于开始时间）")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Result 类型别名
pub type TimeMathResult<T> = Result<T, TimeMathError>;

/// 计算工作时长（小时）
///
/// # 返回
/// - Ok(f64): end - start 的小时数
/// - Err(InvalidInterval): end <= start
pub fn compute_work_duration(start: NaiveDateTime, end: NaiveDateTime) -> TimeMathResult<f64> {
    if end <= start {
        return Err(TimeMathError::InvalidInterval { start, end });
    }
    let millis = (end - start).num_milliseconds();
    Ok(millis as f64 / MILLIS_PER_HOUR)
}

/// 计算加班时长（小时）
///
/// max(0, 工作时长 - 午休 - 名义工时)
pub fn compute_overtime(work_duration_hours: f64, lunch_break_minutes: u32) -> f64 {
    let actual_work_hours = work_duration_hours - f64::from(lunch_break_minutes) / 60.0;
    (actual_work_hours - NOMINAL_WORK_HOURS).max(0.0)
}

/// 有效工作时长（小时）= max(0, 工作时长 - 午休)
pub fn compute_effective_work_time(work_duration_hours: f64, lunch_break_minutes: u32) -> f64 {
    (work_duration_hours - f64::from(lunch_break_minutes) / 60.0).max(0.0)
}

// ==========================================
// 备注时间扣除
// ==========================================

static MINUTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*分(钟)?").expect("分钟正则"));

static HOUR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*小时?").expect("小时正则"));

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("数字正则"));

/// ASCII 单词字符（与浏览器正则 \b 的判定一致）
fn is_ascii_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// 从备注中提取时间扣除（小时）
///
/// 规则：
/// 1) 第一个 "N分" / "N分钟" 计 N/60
/// 2) 第一个 "N小" / "N小时"（可含小数）计 N
/// 3) 其余独立整数：圆模按分钟计 N/60，平压先减半 N/2/60；
///    与规则 1 的数值或规则 2 的整数部分相同的数字不重复计入
///
/// 无法识别的文本按部分或零扣除处理，不会失败。
pub fn extract_remark_time_deduction(remarks: Option<&str>, machine_type: MachineType) -> f64 {
    let Some(text) = remarks else {
        return 0.0;
    };
    if text.trim().is_empty() {
        return 0.0;
    }

    let mut deduction = 0.0;

    let minute_value = MINUTE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok());
    if let Some(minutes) = minute_value {
        deduction += minutes / 60.0;
    }

    let hour_value = HOUR_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok());
    if let Some(hours) = hour_value {
        deduction += hours;
    }
    let hour_integer = hour_value.map(f64::trunc);

    for run in DIGIT_RUN.find_iter(text) {
        let before = text[..run.start()].chars().next_back();
        let after = text[run.end()..].chars().next();
        if before.is_some_and(is_ascii_word) || after.is_some_and(is_ascii_word) {
            continue;
        }

        let Ok(value) = run.as_str().parse::<f64>() else {
            continue;
        };
        if minute_value == Some(value) || hour_integer == Some(value) {
            continue;
        }

        deduction += match machine_type {
            MachineType::Circle => value / 60.0,
            MachineType::Flat => value / 2.0 / 60.0,
        };
    }

    deduction
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const EPS: f64 = 1e-9;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_work_duration_exact_hours() {
        assert!((compute_work_duration(at(8, 0), at(16, 30)).unwrap() - 8.5).abs() < EPS);
        assert!((compute_work_duration(at(8, 0), at(8, 1)).unwrap() - 1.0 / 60.0).abs() < EPS);
    }

    #[test]
    fn test_work_duration_rejects_non_positive_interval() {
        assert_eq!(
            compute_work_duration(at(9, 0), at(9, 0)),
            Err(TimeMathError::InvalidInterval {
                start: at(9, 0),
                end: at(9, 0)
            })
        );
        assert!(compute_work_duration(at(10, 0), at(9, 0)).is_err());
    }

    #[test]
    fn test_overtime() {
        assert_eq!(compute_overtime(8.5, 30), 0.0);
        assert!((compute_overtime(10.0, 30) - 1.5).abs() < EPS);
        assert!((compute_overtime(9.0, 0) - 1.0).abs() < EPS);
        assert_eq!(compute_overtime(0.0, 30), 0.0);
    }

    #[test]
    fn test_overtime_monotonic() {
        let mut previous = 0.0;
        for step in 0..=40 {
            let w = f64::from(step) * 0.5;
            let overtime = compute_overtime(w, 30);
            assert!(overtime >= previous);
            assert!(overtime >= 0.0);
            previous = overtime;
        }

        let mut previous = f64::MAX;
        for lunch in (0..=120).step_by(10) {
            let overtime = compute_overtime(12.0, lunch);
            assert!(overtime <= previous);
            previous = overtime;
        }
    }

    #[test]
    fn test_effective_work_time_clamped() {
        assert!((compute_effective_work_time(8.5, 30) - 8.0).abs() < EPS);
        assert_eq!(compute_effective_work_time(0.25, 30), 0.0);
    }

    #[test]
    fn test_remarks_empty_or_absent() {
        assert_eq!(extract_remark_time_deduction(None, MachineType::Circle), 0.0);
        assert_eq!(extract_remark_time_deduction(Some(""), MachineType::Flat), 0.0);
        assert_eq!(extract_remark_time_deduction(Some("正常生产"), MachineType::Circle), 0.0);
    }

    #[test]
    fn test_remarks_minute_marker_not_double_counted() {
        let d = extract_remark_time_deduction(Some("停机30分钟"), MachineType::Circle);
        assert!((d - 0.5).abs() < EPS);

        let d = extract_remark_time_deduction(Some("换版 45 分"), MachineType::Flat);
        assert!((d - 0.75).abs() < EPS);
    }

    #[test]
    fn test_remarks_hour_marker() {
        let d = extract_remark_time_deduction(Some("停电2小时"), MachineType::Circle);
        assert!((d - 2.0).abs() < EPS);
    }

    #[test]
    fn test_remarks_decimal_hour_counts_fraction_digits_as_bare_number() {
        // "1.5小时" 计 1.5 小时；整数部分 1 去重，小数位 5 作为独立数字计入
        let d = extract_remark_time_deduction(Some("停机1.5小时"), MachineType::Circle);
        assert!((d - (1.5 + 5.0 / 60.0)).abs() < EPS);
    }

    #[test]
    fn test_remarks_bare_numbers_by_machine_type() {
        let circle = extract_remark_time_deduction(Some("换刀 20"), MachineType::Circle);
        assert!((circle - 20.0 / 60.0).abs() < EPS);

        let flat = extract_remark_time_deduction(Some("换刀 20"), MachineType::Flat);
        assert!((flat - 10.0 / 60.0).abs() < EPS);
    }

    #[test]
    fn test_remarks_combined() {
        // 10分 -> 10/60；1小时 -> 1；独立数字 10 与 1 去重，6 按圆模计 6/60
        let d = extract_remark_time_deduction(Some("调色10分,维修1小时,换纸 6"), MachineType::Circle);
        assert!((d - (10.0 / 60.0 + 1.0 + 6.0 / 60.0)).abs() < EPS);
    }

    #[test]
    fn test_remarks_only_first_minute_marker_counts_as_minutes() {
        // 第一个 "10分" 按分钟计；第二个 "20分" 只作为独立数字计入
        let circle = extract_remark_time_deduction(Some("10分 20分"), MachineType::Circle);
        assert!((circle - (10.0 / 60.0 + 20.0 / 60.0)).abs() < EPS);

        let flat = extract_remark_time_deduction(Some("10分 20分"), MachineType::Flat);
        assert!((flat - (10.0 / 60.0 + 20.0 / 2.0 / 60.0)).abs() < EPS);
    }

    #[test]
    fn test_remarks_dedup_by_value() {
        // 同值数字全部视为已匹配
        let d = extract_remark_time_deduction(Some("30分钟 另 30"), MachineType::Circle);
        assert!((d - 0.5).abs() < EPS);
    }

    #[test]
    fn test_remarks_numbers_attached_to_ascii_words_ignored() {
        assert_eq!(extract_remark_time_deduction(Some("型号abc123"), MachineType::Circle), 0.0);
        assert_eq!(extract_remark_time_deduction(Some("12pcs"), MachineType::Circle), 0.0);
    }

    #[test]
    fn test_remarks_deterministic() {
        let text = Some("等料15分钟，停机2小时 8");
        let first = extract_remark_time_deduction(text, MachineType::Flat);
        for _ in 0..5 {
            assert_eq!(extract_remark_time_deduction(text, MachineType::Flat), first);
        }
    }
}
