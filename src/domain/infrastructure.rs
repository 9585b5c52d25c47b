// ==========================================
// 钢轨打磨排程系统 - 基础设施段领域模型
// ==========================================
// 基础设施段（轨枕/轨型/钢种）独立分段，与曲线边界不对齐
// ==========================================

use crate::domain::curve::SegmentId;
use serde::{Deserialize, Serialize};

// ==========================================
// InfrastructureSegment - 基础设施段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureSegment {
    pub km_start: f64,
    pub km_end: f64,
    pub tie_type: Option<String>,    // 轨枕类型
    pub rail_profile: Option<String>, // 轨型
    pub steel_grade: Option<String>,  // 钢种
}

impl InfrastructureSegment {
    pub fn length(&self) -> f64 {
        self.km_end - self.km_start
    }

    /// 半开区间重叠长度，无重叠为 0
    pub fn overlap_with(&self, start: f64, end: f64) -> f64 {
        (self.km_end.min(end) - self.km_start.max(start)).max(0.0)
    }
}

// ==========================================
// AttributedSegment - 挂接结果
// ==========================================
// 区间 = 基础设施段 ∩ 曲线段，长度 > 0
// 未命中曲线时（EMIT_UNATTRIBUTED）曲线字段为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedSegment {
    pub infra_index: usize, // 来源基础设施段在输入中的下标
    pub km_start: f64,
    pub km_end: f64,

    // ===== 曲线侧 =====
    pub curve_id: Option<SegmentId>,
    pub radius: Option<f64>,
    pub wear_margin_min: Option<f64>,

    // ===== 基础设施侧 =====
    pub tie_type: Option<String>,
    pub rail_profile: Option<String>,
    pub steel_grade: Option<String>,
}

impl AttributedSegment {
    pub fn length(&self) -> f64 {
        self.km_end - self.km_start
    }

    pub fn is_attributed(&self) -> bool {
        self.curve_id.is_some()
    }
}

// ==========================================
// InfraMatch - 点查模式下的重叠伙伴
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraMatch {
    pub infra_index: usize,
    pub km_start: f64,
    pub km_end: f64,
    pub overlap: f64,
    pub tie_type: Option<String>,
    pub rail_profile: Option<String>,
    pub steel_grade: Option<String>,
}

// ==========================================
// DominantAttribution - 主导属性挂接结果
// ==========================================
// 每个曲线段取重叠长度最大的基础设施段属性（不切分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantAttribution {
    pub curve_id: SegmentId,
    pub km_start: f64,
    pub km_end: f64,
    pub dominant: Option<InfraMatch>,
    pub matches: Vec<InfraMatch>,
}
