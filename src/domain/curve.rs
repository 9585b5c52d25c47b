// ==========================================
// 钢轨打磨排程系统 - 曲线段领域模型
// ==========================================
// 红线: 曲线段连续、不重叠、按里程有序，km_end > km_start
// 红线: CurveStats 每段只计算一次，之后不可变
// ==========================================

use crate::domain::types::RailSide;
use serde::{Deserialize, Serialize};

/// 曲线段编号（单条线路内单调递增，从 1 开始）
pub type SegmentId = u32;

// ==========================================
// CurveSegment - 曲线段
// ==========================================
// 解码后半径相同的连续测量记录的最大游程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSegment {
    pub id: SegmentId,
    pub line_id: String,
    pub km_start: f64,     // min(von)
    pub km_end: f64,       // max(bis)
    pub mean_radius: f64,  // 游程内半径均值
    pub length: f64,       // km_end - km_start
    pub record_count: usize,
}

impl CurveSegment {
    /// 按比例换算里程（例如 m → km）
    pub fn rescaled(&self, divisor: f64) -> CurveSegment {
        CurveSegment {
            km_start: self.km_start / divisor,
            km_end: self.km_end / divisor,
            length: self.length / divisor,
            ..self.clone()
        }
    }
}

// ==========================================
// ChannelStats - 单通道描述统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub channel: String,
    pub side: RailSide,
    pub sample_count: usize,
    pub median: f64,
    pub mean: f64,
    pub skewness: f64, // 退化组为 0
    pub kurtosis: Option<f64>, // 单样本或零方差组无定义
}

// ==========================================
// SideStats - 单侧最不利通道
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideStats {
    pub side: RailSide,
    pub max_median: f64,       // 三通道中位数最大值
    pub cause_channel: String, // 取得最大值的通道（仅供展示）
    pub wear_margin: f64,      // design_limit - max_median
}

// ==========================================
// CurveStats - 曲线段统计结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveStats {
    pub segment_id: SegmentId,
    pub channels: Vec<ChannelStats>,
    pub left: Option<SideStats>,
    pub right: Option<SideStats>,
    pub max_overall: f64,
    pub wear_margin_min: f64,
}

impl CurveStats {
    /// 由两侧结果构造，wear_margin_min / max_overall 在此唯一确定
    ///
    /// 单侧缺失时取另一侧；两侧均缺失为 NaN
    pub fn new(
        segment_id: SegmentId,
        channels: Vec<ChannelStats>,
        left: Option<SideStats>,
        right: Option<SideStats>,
    ) -> Self {
        let (wear_margin_min, max_overall) = match (&left, &right) {
            (Some(l), Some(r)) => (
                l.wear_margin.min(r.wear_margin),
                l.max_median.max(r.max_median),
            ),
            (Some(s), None) | (None, Some(s)) => (s.wear_margin, s.max_median),
            (None, None) => (f64::NAN, f64::NAN),
        };

        Self {
            segment_id,
            channels,
            left,
            right,
            max_overall,
            wear_margin_min,
        }
    }

    pub fn side(&self, side: RailSide) -> Option<&SideStats> {
        match side {
            RailSide::Left => self.left.as_ref(),
            RailSide::Right => self.right.as_ref(),
        }
    }

    pub fn channel(&self, channel: &str, side: RailSide) -> Option<&ChannelStats> {
        self.channels
            .iter()
            .find(|c| c.channel == channel && c.side == side)
    }
}

// ==========================================
// CurveProfile - 曲线段 + 统计（挂接输入）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveProfile {
    pub segment: CurveSegment,
    pub stats: CurveStats,
}

impl CurveProfile {
    pub fn km_start(&self) -> f64 {
        self.segment.km_start
    }

    pub fn km_end(&self) -> f64 {
        self.segment.km_end
    }
}

// ==========================================
// RadiusProfile - 线路半径分布
// ==========================================
// 全线曲线半径分布形态（逐记录统计）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusProfile {
    pub line_id: String,
    pub record_count: usize,
    pub mean: f64,
    pub median: f64,
    pub skewness: f64,
    pub kurtosis: Option<f64>,
}
