// ==========================================
// 钢轨打磨排程系统 - 领域类型定义
// ==========================================
// 职责: 轨侧 / 波长带 / 紧迫等级 / 策略枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与上游报表一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 轨侧 (Rail Side)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RailSide {
    Left,  // 左轨
    Right, // 右轨
}

impl RailSide {
    /// 固定遍历顺序（左 → 右），保证输出确定性
    pub const ALL: [RailSide; 2] = [RailSide::Left, RailSide::Right];
}

impl fmt::Display for RailSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RailSide::Left => write!(f, "LEFT"),
            RailSide::Right => write!(f, "RIGHT"),
        }
    }
}

// ==========================================
// 波长带 (Wavelength Band)
// ==========================================
// 波磨测量原始通道，单位 mm 波长区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WavelengthBand {
    #[serde(rename = "10-30")]
    W10To30,
    #[serde(rename = "30-100")]
    W30To100,
    #[serde(rename = "100-300")]
    W100To300,
    #[serde(rename = "300-1000")]
    W300To1000,
}

impl fmt::Display for WavelengthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WavelengthBand::W10To30 => write!(f, "10-30"),
            WavelengthBand::W30To100 => write!(f, "30-100"),
            WavelengthBand::W100To300 => write!(f, "100-300"),
            WavelengthBand::W300To1000 => write!(f, "300-1000"),
        }
    }
}

// ==========================================
// 紧迫等级 (Urgency Band)
// ==========================================
// 按剩余年限分档: <=0 已超限, (0,1) 一年内, >=1 安全
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyBand {
    Overdue,       // 已超限
    DueWithinYear, // 一年内到限
    Sound,         // 余量充足
    Unknown,       // 无磨耗余量（未挂接曲线）
}

impl UrgencyBand {
    /// 由剩余年限判定紧迫等级
    pub fn from_years(years: Option<f64>) -> Self {
        match years {
            None => UrgencyBand::Unknown,
            Some(y) if y.is_nan() => UrgencyBand::Unknown,
            Some(y) if y <= 0.0 => UrgencyBand::Overdue,
            Some(y) if y < 1.0 => UrgencyBand::DueWithinYear,
            Some(_) => UrgencyBand::Sound,
        }
    }
}

impl fmt::Display for UrgencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyBand::Overdue => write!(f, "OVERDUE"),
            UrgencyBand::DueWithinYear => write!(f, "DUE_WITHIN_YEAR"),
            UrgencyBand::Sound => write!(f, "SOUND"),
            UrgencyBand::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ==========================================
// 无重叠基础设施段处理策略 (Unmatched Policy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnmatchedPolicy {
    Drop,             // 丢弃
    EmitUnattributed, // 保留，半径/余量置空
}

impl Default for UnmatchedPolicy {
    fn default() -> Self {
        UnmatchedPolicy::Drop
    }
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedPolicy::Drop => write!(f, "DROP"),
            UnmatchedPolicy::EmitUnattributed => write!(f, "EMIT_UNATTRIBUTED"),
        }
    }
}

// ==========================================
// 分类字段 (Category Field)
// ==========================================
// 用途: 未识别类别审计
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryField {
    Radius,
    TieType,
    RailProfile,
    SteelGrade,
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryField::Radius => write!(f, "RADIUS"),
            CategoryField::TieType => write!(f, "TIE_TYPE"),
            CategoryField::RailProfile => write!(f, "RAIL_PROFILE"),
            CategoryField::SteelGrade => write!(f, "STEEL_GRADE"),
        }
    }
}

// ==========================================
// 打磨窗口来源 (Window Origin)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowOrigin {
    Priority, // 按紧迫度入选
    Backfill, // 剩余预算补位
}

impl fmt::Display for WindowOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowOrigin::Priority => write!(f, "PRIORITY"),
            WindowOrigin::Backfill => write!(f, "BACKFILL"),
        }
    }
}
