// ==========================================
// 钢轨打磨排程系统 - 统计聚合引擎
// ==========================================
// 职责: 组合通道派生 + 逐段描述统计 + 磨耗余量
// 输入: 按曲线段分组的测量记录 + 组合通道定义
// 输出: segment_id → CurveStats（BTreeMap，保证确定性顺序）
// 红线: 主通道无有效值的曲线段整段剔除，不以 NaN 占位
// ==========================================

use crate::config::AggregationParams;
use crate::domain::curve::{
    ChannelStats, CurveProfile, CurveStats, RadiusProfile, SegmentId, SideStats,
};
use crate::domain::measurement::{ChannelDefinition, MeasurementRecord};
use crate::domain::types::RailSide;
use crate::engine::segmenter::Segmentation;
use crate::engine::stats;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

// ==========================================
// StatisticalAggregator - 统计聚合引擎
// ==========================================
pub struct StatisticalAggregator {
    // 无状态引擎，不需要注入依赖
}

impl StatisticalAggregator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 逐段聚合
    ///
    /// 规则：
    /// 1) 组合通道 = 指定相邻波长带逐侧求和（任一缺测则该点缺测）
    /// 2) 每通道每侧: 中位数、均值、偏度（safe_skew）、峰度（无退化保护）
    /// 3) 每侧 max = 各通道中位数最大值，cause 记录取得最大值的通道
    /// 4) wear_margin_side = design_limit - max_side，wear_margin_min 取两侧最小
    ///
    /// # 参数
    /// - `groups`: (段编号, 该段记录)
    /// - `params`: 组合通道定义 + 主通道
    /// - `design_limit_mm`: 波磨深度设计限值
    ///
    /// # 返回
    /// segment_id → CurveStats（主通道无值的段不出现）
    pub fn aggregate<'a, I>(
        &self,
        groups: I,
        params: &AggregationParams,
        design_limit_mm: f64,
    ) -> BTreeMap<SegmentId, CurveStats>
    where
        I: IntoIterator<Item = (SegmentId, &'a [MeasurementRecord])>,
    {
        let mut result = BTreeMap::new();
        let mut dropped = 0usize;

        for (segment_id, records) in groups {
            match self.aggregate_group(segment_id, records, params, design_limit_mm) {
                Some(curve_stats) => {
                    result.insert(segment_id, curve_stats);
                }
                None => {
                    dropped += 1;
                    debug!(segment_id, "主通道无有效读数，剔除该曲线段");
                }
            }
        }

        if dropped > 0 {
            warn!(
                dropped_count = dropped,
                primary_channel = %params.primary_channel,
                primary_side = %params.primary_side,
                "部分曲线段因主通道缺测被剔除"
            );
        }

        result
    }

    /// 对分段结果直接聚合
    #[instrument(skip(self, segmentation, params), fields(
        line_id = %segmentation.line_id,
        segments_count = segmentation.segments.len()
    ))]
    pub fn aggregate_segmentation(
        &self,
        segmentation: &Segmentation,
        params: &AggregationParams,
        design_limit_mm: f64,
    ) -> BTreeMap<SegmentId, CurveStats> {
        self.aggregate(
            segmentation.groups().map(|(segment, records)| (segment.id, records)),
            params,
            design_limit_mm,
        )
    }

    /// 曲线段与统计结果按编号拼接（被剔除的段不出现）
    pub fn profiles(
        &self,
        segmentation: &Segmentation,
        curve_stats: &BTreeMap<SegmentId, CurveStats>,
    ) -> Vec<CurveProfile> {
        segmentation
            .segments
            .iter()
            .filter_map(|segment| {
                curve_stats.get(&segment.id).map(|s| CurveProfile {
                    segment: segment.clone(),
                    stats: s.clone(),
                })
            })
            .collect()
    }

    /// 全线半径分布（逐记录）
    pub fn radius_profile(&self, segmentation: &Segmentation) -> Option<RadiusProfile> {
        let radii: Vec<f64> = segmentation
            .records
            .iter()
            .filter_map(|r| r.radius)
            .collect();
        if radii.is_empty() {
            return None;
        }

        Some(RadiusProfile {
            line_id: segmentation.line_id.clone(),
            record_count: radii.len(),
            mean: stats::mean(&radii),
            median: stats::median(&radii),
            skewness: stats::safe_skew(&radii),
            kurtosis: stats::kurtosis(&radii),
        })
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn aggregate_group(
        &self,
        segment_id: SegmentId,
        records: &[MeasurementRecord],
        params: &AggregationParams,
        design_limit_mm: f64,
    ) -> Option<CurveStats> {
        let mut channels = Vec::new();
        for side in RailSide::ALL {
            for definition in &params.channels {
                if let Some(channel_stats) = Self::channel_stats(definition, side, records) {
                    channels.push(channel_stats);
                }
            }
        }

        // 主通道缺测 → 剔除
        let has_primary = channels
            .iter()
            .any(|c| c.channel == params.primary_channel && c.side == params.primary_side);
        if !has_primary {
            return None;
        }

        let left = Self::side_stats(RailSide::Left, &channels, &params.channels, design_limit_mm);
        let right = Self::side_stats(RailSide::Right, &channels, &params.channels, design_limit_mm);

        Some(CurveStats::new(segment_id, channels, left, right))
    }

    fn channel_stats(
        definition: &ChannelDefinition,
        side: RailSide,
        records: &[MeasurementRecord],
    ) -> Option<ChannelStats> {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| definition.value(r, side))
            .collect();
        if values.is_empty() {
            return None;
        }

        Some(ChannelStats {
            channel: definition.name.clone(),
            side,
            sample_count: values.len(),
            median: stats::median(&values),
            mean: stats::mean(&values),
            skewness: stats::safe_skew(&values),
            kurtosis: stats::kurtosis(&values),
        })
    }

    /// 单侧最不利通道（并列时取定义顺序中的第一个）
    fn side_stats(
        side: RailSide,
        channels: &[ChannelStats],
        definitions: &[ChannelDefinition],
        design_limit_mm: f64,
    ) -> Option<SideStats> {
        let mut worst: Option<&ChannelStats> = None;
        for definition in definitions {
            let candidate = channels
                .iter()
                .find(|c| c.side == side && c.channel == definition.name);
            if let Some(candidate) = candidate {
                match worst {
                    Some(w) if candidate.median <= w.median => {}
                    _ => worst = Some(candidate),
                }
            }
        }

        worst.map(|w| SideStats {
            side,
            max_median: w.median,
            cause_channel: w.channel.clone(),
            wear_margin: design_limit_mm - w.median,
        })
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for StatisticalAggregator {
    fn default() -> Self {
        Self::new()
    }
}
