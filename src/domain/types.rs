// ==========================================
// 模切机生产记录系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 机器类型 (Machine Type)
// ==========================================
// 序列化格式: lowercase (与本地存储一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineType {
    Circle, // 圆模切机
    Flat,   // 平压模切机
}

impl MachineType {
    /// 全部机器类型（固定顺序：圆模在前）
    pub const ALL: [MachineType; 2] = [MachineType::Circle, MachineType::Flat];

    /// 存储/导入导出使用的编码
    pub fn code(&self) -> &'static str {
        match self {
            MachineType::Circle => "circle",
            MachineType::Flat => "flat",
        }
    }

    /// 中文显示名称
    pub fn label(&self) -> &'static str {
        match self {
            MachineType::Circle => "圆模切机",
            MachineType::Flat => "平压模切机",
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for MachineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(MachineType::Circle),
            "flat" => Ok(MachineType::Flat),
            other => Err(format!("未知机器类型: {}", other)),
        }
    }
}

// ==========================================
// 记录ID (Record Id)
// ==========================================
// 不透明标识；新建记录使用 UUID v4，导入记录保留原值
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// 生成新的记录ID
    pub fn generate() -> Self {
        RecordId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

// ==========================================
// 进度等级 (Progress Level)
// ==========================================
// 用于界面进度条着色（danger / warning / success）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Danger,
    Warning,
    Success,
}

impl ProgressLevel {
    /// 按阈值分级：< danger_below 为 Danger，< warning_below 为 Warning
    pub fn classify(percentage: f64, danger_below: f64, warning_below: f64) -> Self {
        if percentage < danger_below {
            ProgressLevel::Danger
        } else if percentage < warning_below {
            ProgressLevel::Warning
        } else {
            ProgressLevel::Success
        }
    }
}
