// ==========================================
// 模切机生产记录系统 - 时间戳格式
// ==========================================
// 表单/存储中的时间为本地墙上时间 "YYYY-MM-DDTHH:MM"
// ==========================================

use chrono::{DateTime, NaiveDateTime};

/// 表单格式（datetime-local）
pub const FORM_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// 可接受的无时区格式（按顺序尝试）
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// 解析时间戳
///
/// # 说明
/// - 支持 datetime-local 格式（有无秒、T 或空格分隔）
/// - 支持 RFC 3339：丢弃时区偏移，保留墙上时间
/// - 空串或无法解析返回 None
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|ts| ts.naive_local())
}

/// 格式化时间戳（整分钟时省略秒，与表单格式一致）
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    use chrono::Timelike;

    if ts.second() == 0 && ts.nanosecond() == 0 {
        ts.format(FORM_FORMAT).to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// serde 适配：NaiveDateTime <-> 表单字符串
pub mod serde_form {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("无效的时间格式: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_parse_form_formats() {
        assert_eq!(parse_timestamp("2025-03-14T08:30"), Some(ts(8, 30, 0)));
        assert_eq!(parse_timestamp("2025-03-14T08:30:15"), Some(ts(8, 30, 15)));
        assert_eq!(parse_timestamp("2025-03-14 08:30"), Some(ts(8, 30, 0)));
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        assert_eq!(
            parse_timestamp("2025-03-14T08:30:00+08:00"),
            Some(ts(8, 30, 0))
        );
        assert_eq!(parse_timestamp("2025-03-14T08:30:00Z"), Some(ts(8, 30, 0)));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2025-13-40T08:30"), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&ts(8, 30, 0)), "2025-03-14T08:30");
        assert_eq!(format_timestamp(&ts(8, 30, 5)), "2025-03-14T08:30:05");
    }
}
