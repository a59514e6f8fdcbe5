// ==========================================
// 模切机生产记录系统 - 全局设置
// ==========================================
// 职责: 设置项定义、默认值、校验、局部覆盖合并
// 存储: 本地键值存储 "settings"（JSON，键名与导出文件一致）
// ==========================================

use crate::domain::types::MachineType;
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ===== 默认值 =====
pub const DEFAULT_CIRCLE_DAILY_TARGET: f64 = 50_000.0;
pub const DEFAULT_FLAT_DAILY_TARGET: f64 = 110_000.0;
pub const DEFAULT_WORK_HOURS: f64 = 8.0;
pub const DEFAULT_LUNCH_BREAK_MINUTES: u32 = 30;
pub const DEFAULT_CIRCLE_HOURLY_RATE: f64 = 6_250.0;
pub const DEFAULT_FLAT_HOURLY_RATE: f64 = 13_750.0;
pub const DEFAULT_CIRCLE_SETUP_PENALTY: f64 = 0.25;
pub const DEFAULT_FLAT_SETUP_PENALTY: f64 = 0.5;

// ==========================================
// Settings - 全局设置（单例，整体替换）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub circle_daily_target: f64,   // 圆模日目标（仅展示，不参与分配公式）
    pub flat_daily_target: f64,     // 平压日目标（仅展示，不参与分配公式）
    #[serde(rename = "workHours")]
    pub work_hours_per_day: f64,    // 名义班长（小时）
    #[serde(rename = "lunchBreak")]
    pub lunch_break_minutes: u32,   // 午休（分钟）
    pub circle_hourly_rate: f64,    // 圆模每小时刀数
    pub flat_hourly_rate: f64,      // 平压每小时刀数
    pub circle_setup_penalty: f64,  // 圆模每次调机扣减（小时）
    pub flat_setup_penalty: f64,    // 平压每次调机扣减（小时）
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            circle_daily_target: DEFAULT_CIRCLE_DAILY_TARGET,
            flat_daily_target: DEFAULT_FLAT_DAILY_TARGET,
            work_hours_per_day: DEFAULT_WORK_HOURS,
            lunch_break_minutes: DEFAULT_LUNCH_BREAK_MINUTES,
            circle_hourly_rate: DEFAULT_CIRCLE_HOURLY_RATE,
            flat_hourly_rate: DEFAULT_FLAT_HOURLY_RATE,
            circle_setup_penalty: DEFAULT_CIRCLE_SETUP_PENALTY,
            flat_setup_penalty: DEFAULT_FLAT_SETUP_PENALTY,
        }
    }
}

/// 设置校验违规
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsViolation {
    WorkHoursNotPositive,
    HourlyRateNotPositive(MachineType),
    SetupPenaltyNegative(MachineType),
}

impl SettingsViolation {
    /// 本地化提示文本
    pub fn message(&self) -> String {
        match self {
            SettingsViolation::WorkHoursNotPositive => t("settings.work_hours_positive"),
            SettingsViolation::HourlyRateNotPositive(machine) => t_with_args(
                "settings.hourly_rate_positive",
                &[("machine", machine.label())],
            ),
            SettingsViolation::SetupPenaltyNegative(machine) => t_with_args(
                "settings.setup_penalty_non_negative",
                &[("machine", machine.label())],
            ),
        }
    }
}

impl Settings {
    /// 指定机器类型的每小时刀数 (G)
    pub fn hourly_rate(&self, machine_type: MachineType) -> f64 {
        match machine_type {
            MachineType::Circle => self.circle_hourly_rate,
            MachineType::Flat => self.flat_hourly_rate,
        }
    }

    /// 指定机器类型的每次调机扣减小时 (K)
    pub fn setup_penalty(&self, machine_type: MachineType) -> f64 {
        match machine_type {
            MachineType::Circle => self.circle_setup_penalty,
            MachineType::Flat => self.flat_setup_penalty,
        }
    }

    /// 指定机器类型的展示用日目标
    pub fn nominal_daily_target(&self, machine_type: MachineType) -> f64 {
        match machine_type {
            MachineType::Circle => self.circle_daily_target,
            MachineType::Flat => self.flat_daily_target,
        }
    }

    /// 校验设置（收集全部违规）
    pub fn validate(&self) -> Vec<SettingsViolation> {
        let mut violations = Vec::new();

        if !(self.work_hours_per_day.is_finite() && self.work_hours_per_day > 0.0) {
            violations.push(SettingsViolation::WorkHoursNotPositive);
        }

        for machine in MachineType::ALL {
            let rate = self.hourly_rate(machine);
            if !(rate.is_finite() && rate > 0.0) {
                violations.push(SettingsViolation::HourlyRateNotPositive(machine));
            }
        }

        for machine in MachineType::ALL {
            let penalty = self.setup_penalty(machine);
            if !(penalty.is_finite() && penalty >= 0.0) {
                violations.push(SettingsViolation::SetupPenaltyNegative(machine));
            }
        }

        violations
    }

    /// 以 JSON 对象局部覆盖当前设置（未出现的键保持原值）
    ///
    /// # 返回
    /// - Ok(Settings): 合并后的新设置
    /// - Err: patch 不是对象，或字段类型不匹配
    pub fn merged_with(&self, patch: &Value) -> Result<Settings, serde_json::Error> {
        let Value::Object(patch_map) = patch else {
            return Err(serde::de::Error::custom("设置必须为 JSON 对象"));
        };

        let mut base = serde_json::to_value(self)?;
        if let Value::Object(base_map) = &mut base {
            for (key, value) in patch_map {
                base_map.insert(key.clone(), value.clone());
            }
        }

        serde_json::from_value(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.work_hours_per_day, 8.0);
        assert_eq!(settings.lunch_break_minutes, 30);
        assert_eq!(settings.hourly_rate(MachineType::Circle), 6250.0);
        assert_eq!(settings.hourly_rate(MachineType::Flat), 13750.0);
        assert_eq!(settings.setup_penalty(MachineType::Circle), 0.25);
        assert_eq!(settings.setup_penalty(MachineType::Flat), 0.5);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_settings_json_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["workHours"], 8.0);
        assert_eq!(json["lunchBreak"], 30);
        assert_eq!(json["circleHourlyRate"], 6250.0);
        assert_eq!(json["flatSetupPenalty"], 0.5);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"lunchBreak": 45}"#).unwrap();
        assert_eq!(settings.lunch_break_minutes, 45);
        assert_eq!(settings.work_hours_per_day, 8.0);
    }

    #[test]
    fn test_merged_with_overrides_only_given_keys() {
        let base = Settings::default();
        let merged = base
            .merged_with(&json!({"circleHourlyRate": 7000, "unknownKey": true}))
            .unwrap();
        assert_eq!(merged.circle_hourly_rate, 7000.0);
        assert_eq!(merged.flat_hourly_rate, 13750.0);

        assert!(base.merged_with(&json!([1, 2])).is_err());
        assert!(base.merged_with(&json!({"lunchBreak": "abc"})).is_err());
    }

    #[test]
    fn test_validate_collects_all() {
        let settings = Settings {
            work_hours_per_day: 0.0,
            circle_hourly_rate: 0.0,
            flat_hourly_rate: -1.0,
            flat_setup_penalty: -0.5,
            ..Settings::default()
        };
        let violations = settings.validate();
        assert_eq!(
            violations,
            vec![
                SettingsViolation::WorkHoursNotPositive,
                SettingsViolation::HourlyRateNotPositive(MachineType::Circle),
                SettingsViolation::HourlyRateNotPositive(MachineType::Flat),
                SettingsViolation::SetupPenaltyNegative(MachineType::Flat),
            ]
        );
    }
}
