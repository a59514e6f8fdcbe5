// ==========================================
// 模切机生产记录系统 - 生产记录领域模型
// ==========================================
// 红线: 派生字段只能由 RecordBuilder 计算写入
// 序列化: camelCase 键名，与本地存储/导出文件一致
// ==========================================

use crate::domain::timestamp;
use crate::domain::types::{MachineType, RecordId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ==========================================
// ShiftRecord - 班次生产记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    // ===== 标识 =====
    pub id: RecordId,                       // 不透明唯一标识（创建后不可变）
    #[serde(rename = "recordNumber")]
    pub sequence_number: u64,               // 全局递增编号（删除后不复用）

    // ===== 录入字段 =====
    pub machine_type: MachineType,          // 机器类型
    pub product_name: String,               // 产品名称
    #[serde(with = "timestamp::serde_form")]
    pub start_time: NaiveDateTime,          // 开机时间
    #[serde(with = "timestamp::serde_form")]
    pub end_time: NaiveDateTime,            // 结束时间（> 开机时间）
    #[serde(rename = "setupTime")]
    pub setup_time_minutes: u32,            // 调机时间（分钟）
    pub cuts: u64,                          // 模切刀数
    pub completed_per_cut: u32,             // 每刀完成数（>= 1）
    #[serde(default)]
    pub remarks: String,                    // 备注（可含时间扣除提示）

    // ===== 派生字段 =====
    pub date: NaiveDate,                    // 开机日期（分组键）
    pub created_at: DateTime<Utc>,          // 创建时间
    pub lunch_break_minutes: u32,           // 创建时的午休分钟数快照
    #[serde(rename = "workDuration")]
    pub work_duration_hours: f64,           // 工作时长（小时）
    #[serde(rename = "effectiveWorkTime")]
    pub effective_work_time_hours: f64,     // 有效工作时长 = max(0, 时长 - 午休)
    #[serde(rename = "remarksTimeDeduction")]
    pub remarks_time_deduction_hours: f64,  // 备注时间扣除（小时）
    pub setup_time_hours: f64,              // 调机时间（小时）
    #[serde(rename = "overtime")]
    pub overtime_hours: f64,                // 加班时长（小时）
}

impl ShiftRecord {
    /// 完成数量 = 刀数 × 每刀完成数
    pub fn finished_units(&self) -> u64 {
        self.cuts.saturating_mul(u64::from(self.completed_per_cut))
    }

    /// 实际工作小时（聚合口径：时长 - 午休快照，不做截断）
    pub fn worked_hours(&self) -> f64 {
        self.work_duration_hours - f64::from(self.lunch_break_minutes) / 60.0
    }

    /// 是否属于指定月份（"YYYY-MM" 前缀匹配）
    pub fn in_month(&self, year: i32, month: u32) -> bool {
        use chrono::Datelike;
        self.date.year() == year && self.date.month() == month
    }
}

// ==========================================
// ShiftEntryDraft - 待校验的录入表单
// ==========================================
// 所有字段保持原始文本，由 RecordValidator 负责解析
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShiftEntryDraft {
    pub machine_type: String,
    pub product_name: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(rename = "setupTime")]
    pub setup_time_minutes: String,
    pub cuts: String,
    pub completed_per_cut: String,
    pub remarks: String,
}

// ==========================================
// ValidatedEntry - 校验通过的录入数据
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub machine_type: MachineType,
    pub product_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub setup_time_minutes: u32,
    pub cuts: u64,
    pub completed_per_cut: u32,
    pub remarks: String,
}

// ==========================================
// RawShiftRecord - 宽松结构（导入文件/历史存储）
// ==========================================
// 字段可能缺失、类型可能为字符串或数字；由 RecordBuilder 归一化
// 派生字段（date / workDuration / overtime 等）一律重新计算，不读取
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawShiftRecord {
    pub id: Option<Value>,
    pub record_number: Option<Value>,
    #[serde(deserialize_with = "deserialize_loose_text")]
    pub machine_type: Option<String>,
    #[serde(deserialize_with = "deserialize_loose_text")]
    pub product_name: Option<String>,
    #[serde(deserialize_with = "deserialize_loose_text")]
    pub start_time: Option<String>,
    #[serde(deserialize_with = "deserialize_loose_text")]
    pub end_time: Option<String>,
    pub setup_time: Option<Value>,
    #[serde(deserialize_with = "deserialize_present")]
    pub cuts: Option<Value>,
    pub completed_per_cut: Option<Value>,
    #[serde(deserialize_with = "deserialize_loose_text")]
    pub remarks: Option<String>,
    #[serde(deserialize_with = "deserialize_loose_text")]
    pub created_at: Option<String>,
    pub lunch_break_minutes: Option<Value>,
}

/// 字段出现即视为已定义（包括 null）
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// 文本字段宽松读取：数字与布尔值转为文本，null / 数组 / 对象视为缺失
fn deserialize_loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

impl RawShiftRecord {
    /// 记录ID（字符串或数字），空值返回 None
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// 导入有效性：id / 机器类型 / 产品名称 / 开始结束时间非空，且 cuts 已定义
    pub fn has_required_fields(&self) -> bool {
        let non_empty = |v: &Option<String>| v.as_deref().map(|s| !s.is_empty()).unwrap_or(false);

        self.id_text().is_some()
            && non_empty(&self.machine_type)
            && non_empty(&self.product_name)
            && non_empty(&self.start_time)
            && non_empty(&self.end_time)
            && self.cuts.is_some()
    }

    /// 有效的记录编号（缺失或超出范围返回 None）
    pub fn record_number(&self) -> Option<u64> {
        self.record_number.as_ref().and_then(value_as_record_number)
    }
}

/// 记录编号上限（2^53 - 1，超出后浮点数无法精确表示整数）
pub const MAX_RECORD_NUMBER: u64 = 9_007_199_254_740_991;

/// 读取记录编号：取整后须在 1..=MAX_RECORD_NUMBER 范围内
pub fn value_as_record_number(value: &Value) -> Option<u64> {
    value_as_f64(value)
        .map(f64::trunc)
        .filter(|v| *v >= 1.0 && *v <= MAX_RECORD_NUMBER as f64)
        .map(|v| v as u64)
}

/// 宽松数值读取：数字或数字字符串
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ShiftRecord {
        let start = timestamp::parse_timestamp("2025-03-14T08:00").unwrap();
        let end = timestamp::parse_timestamp("2025-03-14T16:30").unwrap();
        ShiftRecord {
            id: RecordId::from("r-1"),
            sequence_number: 7,
            machine_type: MachineType::Circle,
            product_name: "彩盒A".to_string(),
            start_time: start,
            end_time: end,
            setup_time_minutes: 30,
            cuts: 12000,
            completed_per_cut: 4,
            remarks: String::new(),
            date: start.date(),
            created_at: Utc::now(),
            lunch_break_minutes: 30,
            work_duration_hours: 8.5,
            effective_work_time_hours: 8.0,
            remarks_time_deduction_hours: 0.0,
            setup_time_hours: 0.5,
            overtime_hours: 0.0,
        }
    }

    #[test]
    fn test_record_json_keys() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["recordNumber"], 7);
        assert_eq!(json["machineType"], "circle");
        assert_eq!(json["startTime"], "2025-03-14T08:00");
        assert_eq!(json["setupTime"], 30);
        assert_eq!(json["workDuration"], 8.5);
        assert_eq!(json["date"], "2025-03-14");
        assert!(json.get("overtime").is_some());
    }

    #[test]
    fn test_finished_units_and_worked_hours() {
        let record = sample_record();
        assert_eq!(record.finished_units(), 48000);
        assert!((record.worked_hours() - 8.0).abs() < 1e-9);
        assert!(record.in_month(2025, 3));
        assert!(!record.in_month(2025, 4));
    }

    #[test]
    fn test_raw_record_cuts_presence() {
        let with_null: RawShiftRecord = serde_json::from_str(
            r#"{"id":"1","machineType":"flat","productName":"P","startTime":"2025-03-14T08:00","endTime":"2025-03-14T09:00","cuts":null}"#,
        )
        .unwrap();
        assert!(with_null.has_required_fields());

        let missing: RawShiftRecord = serde_json::from_str(
            r#"{"id":"1","machineType":"flat","productName":"P","startTime":"2025-03-14T08:00","endTime":"2025-03-14T09:00"}"#,
        )
        .unwrap();
        assert!(!missing.has_required_fields());
    }

    #[test]
    fn test_raw_record_numeric_id() {
        let raw: RawShiftRecord = serde_json::from_str(r#"{"id":1710400000000}"#).unwrap();
        assert_eq!(raw.id_text().as_deref(), Some("1710400000000"));
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(value_as_f64(&serde_json::json!(12)), Some(12.0));
        assert_eq!(value_as_f64(&serde_json::json!("30")), Some(30.0));
        assert_eq!(value_as_f64(&serde_json::json!("abc")), None);
        assert_eq!(value_as_f64(&Value::Null), None);
    }

    #[test]
    fn test_record_number_range() {
        use serde_json::json;
        assert_eq!(value_as_record_number(&json!(7)), Some(7));
        assert_eq!(value_as_record_number(&json!("12.9")), Some(12));
        assert_eq!(value_as_record_number(&json!(0)), None);
        assert_eq!(value_as_record_number(&json!(1e20)), None);
        assert_eq!(
            value_as_record_number(&json!(MAX_RECORD_NUMBER)),
            Some(MAX_RECORD_NUMBER)
        );
    }

    #[test]
    fn test_raw_record_loose_text_fields() {
        let raw: RawShiftRecord = serde_json::from_str(
            r#"{"id":"1","machineType":"flat","productName":123,"startTime":"2025-03-14T08:00","endTime":"2025-03-14T09:00","cuts":1,"remarks":5,"createdAt":{}}"#,
        )
        .unwrap();
        assert_eq!(raw.product_name.as_deref(), Some("123"));
        assert_eq!(raw.remarks.as_deref(), Some("5"));
        assert_eq!(raw.created_at, None);
        assert!(raw.has_required_fields());
    }
}
