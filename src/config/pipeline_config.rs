// ==========================================
// 钢轨打磨排程系统 - 流水线运行参数
// ==========================================
// 职责: 显式数值参数（设计限值/预算/合并阈值等）
// 红线: 引擎逻辑内不埋默认值，全部经由本结构传入
// 存储: JSON 文件（外部提供），缺省值见 Default
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::measurement::ChannelDefinition;
use crate::domain::types::{RailSide, UnmatchedPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ==========================================
// SegmentationParams - 曲线分段参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    /// 半径下限（m，含）
    pub radius_min: f64,
    /// 半径上限（m，含）
    pub radius_max: f64,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            radius_min: 10.0,
            radius_max: 600.0,
        }
    }
}

// ==========================================
// AggregationParams - 统计聚合参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationParams {
    /// 组合通道定义
    pub channels: Vec<ChannelDefinition>,
    /// 主通道：该通道无有效值的曲线段整段剔除
    pub primary_channel: String,
    pub primary_side: RailSide,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            channels: ChannelDefinition::standard_set(),
            primary_channel: "10-100".to_string(),
            primary_side: RailSide::Left,
        }
    }
}

// ==========================================
// AttributionParams - 区间挂接参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionParams {
    /// 测量里程 → 基础设施里程的换算除数（m → km 为 1000）
    pub curve_position_scale: f64,
    /// 无重叠基础设施段处理策略
    pub unmatched_policy: UnmatchedPolicy,
    /// 基础设施段最大长度（km），超出视为录入错误；None 不限
    pub max_infra_segment_length: Option<f64>,
    /// 轨型别名（旧称 → 标准轨型）
    pub rail_profile_aliases: BTreeMap<String, String>,
}

impl Default for AttributionParams {
    fn default() -> Self {
        let mut rail_profile_aliases = BTreeMap::new();
        rail_profile_aliases.insert("CFF I".to_string(), "46 E1".to_string());
        rail_profile_aliases.insert("CFF IV".to_string(), "54 E2".to_string());

        Self {
            curve_position_scale: 1000.0,
            unmatched_policy: UnmatchedPolicy::Drop,
            max_infra_segment_length: None,
            rail_profile_aliases,
        }
    }
}

// ==========================================
// LifeParams - 剩余寿命参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeParams {
    /// 是否将负年限截断为 0（默认关闭，保留超限程度）
    pub clip_negative_years: bool,
    /// 频率为 0（未观测到磨耗发展）时的哨兵年限
    pub no_progression_years: f64,
}

impl Default for LifeParams {
    fn default() -> Self {
        Self {
            clip_negative_years: false,
            no_progression_years: 9999.0,
        }
    }
}

// ==========================================
// SchedulerParams - 打磨排程参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerParams {
    /// 预算（货币单位）
    pub budget: f64,
    /// 单位长度打磨成本（货币/km）
    pub cost_per_unit_length: f64,
    /// 合并间隙阈值（km）
    pub merge_gap_threshold: f64,
    /// 可继续合并的游程长度上限（km）
    pub max_mergeable_run_length: f64,
    /// 入选年限上限（years_to_threshold <= 该值）
    pub eligibility_horizon_years: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            budget: 42000.0,
            cost_per_unit_length: 10000.0,
            merge_gap_threshold: 0.19,
            max_mergeable_run_length: 0.85,
            eligibility_horizon_years: 1.0,
        }
    }
}

// ==========================================
// PipelineConfig - 流水线配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 波磨深度设计限值（mm）
    pub design_limit_mm: f64,
    pub segmentation: SegmentationParams,
    pub aggregation: AggregationParams,
    pub attribution: AttributionParams,
    pub life: LifeParams,
    pub scheduler: SchedulerParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            design_limit_mm: 0.08,
            segmentation: SegmentationParams::default(),
            aggregation: AggregationParams::default(),
            attribution: AttributionParams::default(),
            life: LifeParams::default(),
            scheduler: SchedulerParams::default(),
        }
    }
}

impl PipelineConfig {
    /// 从 JSON 字符串加载并校验
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: PipelineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载并校验
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// 配置快照（JSON），用于结果溯源
    pub fn snapshot_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 校验全部数值参数
    pub fn validate(&self) -> ConfigResult<()> {
        require_positive("design_limit_mm", self.design_limit_mm)?;

        let seg = &self.segmentation;
        require_finite("segmentation.radius_min", seg.radius_min)?;
        require_finite("segmentation.radius_max", seg.radius_max)?;
        if seg.radius_min > seg.radius_max {
            return Err(ConfigError::invalid(
                "segmentation.radius_min",
                seg.radius_min,
                "半径下限大于上限",
            ));
        }

        let agg = &self.aggregation;
        if agg.channels.is_empty() {
            return Err(ConfigError::invalid(
                "aggregation.channels",
                "[]",
                "至少需要一个组合通道",
            ));
        }
        if let Some(empty) = agg.channels.iter().find(|c| c.bands.is_empty()) {
            return Err(ConfigError::invalid(
                "aggregation.channels",
                &empty.name,
                "组合通道未包含任何波长带",
            ));
        }
        if !agg.channels.iter().any(|c| c.name == agg.primary_channel) {
            return Err(ConfigError::invalid(
                "aggregation.primary_channel",
                &agg.primary_channel,
                "主通道不在组合通道定义中",
            ));
        }

        let attr = &self.attribution;
        require_positive("attribution.curve_position_scale", attr.curve_position_scale)?;
        if let Some(max_len) = attr.max_infra_segment_length {
            require_positive("attribution.max_infra_segment_length", max_len)?;
        }

        require_finite("life.no_progression_years", self.life.no_progression_years)?;

        let sch = &self.scheduler;
        require_non_negative("scheduler.budget", sch.budget)?;
        require_positive("scheduler.cost_per_unit_length", sch.cost_per_unit_length)?;
        require_non_negative("scheduler.merge_gap_threshold", sch.merge_gap_threshold)?;
        require_non_negative(
            "scheduler.max_mergeable_run_length",
            sch.max_mergeable_run_length,
        )?;
        require_finite(
            "scheduler.eligibility_horizon_years",
            sch.eligibility_horizon_years,
        )?;

        Ok(())
    }
}

fn require_finite(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, value, "必须为有限数值"))
    }
}

fn require_positive(key: &str, value: f64) -> ConfigResult<()> {
    require_finite(key, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, value, "必须大于 0"))
    }
}

fn require_non_negative(key: &str, value: f64) -> ConfigResult<()> {
    require_finite(key, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, value, "不能为负数"))
    }
}
