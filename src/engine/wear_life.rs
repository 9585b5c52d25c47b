// ==========================================
// 钢轨打磨排程系统 - 剩余寿命估计引擎
// ==========================================
// 职责: 标准单元编码 + 频率查表 + 剩余年限 + 紧迫等级
// 输入: 挂接段 + 设计限值 + 标定数据（频率表/分类规则）
// 输出: LifeEstimate
// 红线: 频率为 0 不得产生除零，使用哨兵年限并显式标记
// 红线: 频率为 0 且已超限的段取负哨兵年限，仍为最紧迫
// 红线: 负年限默认保留（超限程度），截断为 0 仅作为显式开关
// ==========================================

use crate::config::{Calibration, LifeParams};
use crate::domain::infrastructure::AttributedSegment;
use crate::domain::life::{ClassificationAudit, LifeEstimate, UnclassifiedValue};
use crate::domain::types::{CategoryField, UrgencyBand};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

// ==========================================
// LifeAssessment - 批量估计结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeAssessment {
    pub estimates: Vec<LifeEstimate>,
    pub audit: ClassificationAudit,
    pub default_frequency_count: usize, // 表外编码数量
    pub zero_frequency_count: usize,    // 频率为 0 的段数
}

// ==========================================
// WearLifeEstimator - 剩余寿命估计引擎
// ==========================================
pub struct WearLifeEstimator {
    // 无状态引擎，不需要注入依赖
}

impl WearLifeEstimator {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 单段剩余寿命估计
    ///
    /// years_to_threshold = wear_margin_min / (design_limit × annual_frequency)
    ///
    /// # 返回
    /// - 无磨耗余量（未挂接曲线）: years = None, urgency = Unknown
    /// - 频率为 0 且余量 >= 0: years = no_progression_years
    /// - 频率为 0 且余量 < 0（已超限）: years = -no_progression_years
    /// - 以上两种情况 no_wear_progression = true
    pub fn estimate_life(
        &self,
        segment: &AttributedSegment,
        design_limit_mm: f64,
        calibration: &Calibration,
        params: &LifeParams,
    ) -> LifeEstimate {
        let rules = &calibration.classification;

        // 1. 分类
        let radius = rules.classify_radius(segment.radius);
        let tie = rules.classify_tie(segment.tie_type.as_deref());
        let rail = rules.classify_rail(segment.rail_profile.as_deref());
        let steel = rules.classify_steel(segment.steel_grade.as_deref());

        let mut unclassified = Vec::new();
        if !radius.recognised {
            unclassified.push(UnclassifiedValue {
                field: CategoryField::Radius,
                value: segment.radius.map(|r| r.to_string()),
            });
        }
        for (digit, field, value) in [
            (tie, CategoryField::TieType, &segment.tie_type),
            (rail, CategoryField::RailProfile, &segment.rail_profile),
            (steel, CategoryField::SteelGrade, &segment.steel_grade),
        ] {
            if !digit.recognised {
                unclassified.push(UnclassifiedValue {
                    field,
                    value: value.clone(),
                });
            }
        }

        // 2. 编码 + 查表
        let element_code = rules.compose(radius.code, tie.code, rail.code, steel.code);
        let (annual_frequency, frequency_from_table) = calibration.frequencies.lookup(&element_code);

        // 3. 剩余年限
        let no_wear_progression = annual_frequency == 0.0;
        let years_to_threshold = segment.wear_margin_min.map(|margin| {
            let years = if !no_wear_progression {
                margin / (design_limit_mm * annual_frequency)
            } else if margin < 0.0 {
                -params.no_progression_years
            } else {
                params.no_progression_years
            };
            if params.clip_negative_years && years < 0.0 {
                0.0
            } else {
                years
            }
        });

        LifeEstimate {
            segment: segment.clone(),
            element_code,
            annual_frequency,
            frequency_from_table,
            years_to_threshold,
            no_wear_progression,
            urgency: UrgencyBand::from_years(years_to_threshold),
            unclassified,
        }
    }

    /// 批量估计 + 未识别类别审计
    #[instrument(skip(self, segments, calibration, params), fields(
        segments_count = segments.len(),
        calibration_version = %calibration.version()
    ))]
    pub fn estimate_batch(
        &self,
        segments: &[AttributedSegment],
        design_limit_mm: f64,
        calibration: &Calibration,
        params: &LifeParams,
    ) -> LifeAssessment {
        let mut audit = ClassificationAudit::default();
        let mut default_frequency_count = 0;
        let mut zero_frequency_count = 0;

        let estimates: Vec<LifeEstimate> = segments
            .iter()
            .map(|segment| {
                let estimate = self.estimate_life(segment, design_limit_mm, calibration, params);
                for value in &estimate.unclassified {
                    audit.record(value);
                }
                if !estimate.frequency_from_table {
                    default_frequency_count += 1;
                }
                if estimate.no_wear_progression && estimate.years_to_threshold.is_some() {
                    zero_frequency_count += 1;
                }
                estimate
            })
            .collect();

        if !audit.is_empty() {
            for (field, values) in &audit.counts {
                warn!(
                    field = %field,
                    distinct_values = values.len(),
                    occurrences = values.values().sum::<usize>(),
                    "存在未识别类别，已使用哨兵编码"
                );
            }
        }
        if zero_frequency_count > 0 {
            warn!(
                zero_frequency_count,
                sentinel_years = params.no_progression_years,
                "频率为 0 的段使用哨兵年限"
            );
        }

        LifeAssessment {
            estimates,
            audit,
            default_frequency_count,
            zero_frequency_count,
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for WearLifeEstimator {
    fn default() -> Self {
        Self::new()
    }
}
