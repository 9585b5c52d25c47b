// ==========================================
// 钢轨打磨排程系统 - 流水线编排器
// ==========================================
// 用途: 协调五大核心引擎的执行顺序
// 分段 → 聚合 → (清洗) → 挂接 → 寿命估计 → 排程
// 红线: 数据错误只中止当前线路，不影响其他线路
// 红线: 相同输入 + 相同配置 → 字节一致的输出（无随机、无哈希序）
// ==========================================

use crate::config::{Calibration, ConfigResult, PipelineConfig};
use crate::domain::curve::{CurveProfile, CurveSegment, CurveStats, RadiusProfile, SegmentId};
use crate::domain::infrastructure::{AttributedSegment, DominantAttribution, InfrastructureSegment};
use crate::domain::life::ClassificationAudit;
use crate::domain::maintenance::Selection;
use crate::domain::measurement::MeasurementRecord;
use crate::engine::error::EngineResult;
use crate::engine::{
    CurveSegmenter, InfraCleaner, InfraCleaning, IntervalAttributor, LifeAssessment,
    MaintenanceScheduler, StatisticalAggregator, WearLifeEstimator,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

// ==========================================
// LineInput - 单线路输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineInput {
    pub line_id: String,
    pub infrastructure: Vec<InfrastructureSegment>,
    /// 线路级预算，None 时使用配置预算
    pub budget: Option<f64>,
}

impl LineInput {
    pub fn new(line_id: &str, infrastructure: Vec<InfrastructureSegment>) -> Self {
        Self {
            line_id: line_id.to_string(),
            infrastructure,
            budget: None,
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }
}

// ==========================================
// LineReport - 单线路结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineReport {
    pub line_id: String,
    pub calibration_version: String,

    // CurveSegmenter 输出（测量里程单位）
    pub segments: Vec<CurveSegment>,

    // StatisticalAggregator 输出
    pub curve_stats: BTreeMap<SegmentId, CurveStats>,
    pub radius_profile: Option<RadiusProfile>,

    // InfraCleaner 输出
    pub infra_cleaning: InfraCleaning,

    // IntervalAttributor 输出（基础设施里程单位，infra_index 指向原始输入）
    pub attributed: Vec<AttributedSegment>,
    pub dominant: Vec<DominantAttribution>,

    // WearLifeEstimator 输出
    pub life: LifeAssessment,

    // MaintenanceScheduler 输出
    pub selection: Selection,
}

// ==========================================
// NetworkReport - 全网结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkReport {
    /// 线路 → 结果（失败线路保留错误，不影响其他线路）
    pub lines: BTreeMap<String, EngineResult<LineReport>>,
    /// 成功线路的未识别类别汇总
    pub audit: ClassificationAudit,
}

impl NetworkReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &LineReport> {
        self.lines.values().filter_map(|outcome| outcome.as_ref().ok())
    }

    pub fn failed_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(_, outcome)| outcome.is_err())
            .map(|(line_id, _)| line_id.as_str())
            .collect()
    }
}

// ==========================================
// GrindingPipeline - 流水线编排器
// ==========================================
pub struct GrindingPipeline {
    config: PipelineConfig,
    calibration: Calibration,
    segmenter: CurveSegmenter,
    aggregator: StatisticalAggregator,
    cleaner: InfraCleaner,
    attributor: IntervalAttributor,
    estimator: WearLifeEstimator,
    scheduler: MaintenanceScheduler,
}

impl GrindingPipeline {
    /// 创建编排器（配置与标定数据在此校验）
    pub fn new(config: PipelineConfig, calibration: Calibration) -> ConfigResult<Self> {
        config.validate()?;
        calibration.validate()?;

        Ok(Self {
            segmenter: CurveSegmenter::new(),
            aggregator: StatisticalAggregator::new(),
            cleaner: InfraCleaner::new(
                config.attribution.max_infra_segment_length,
                config.attribution.rail_profile_aliases.clone(),
            ),
            attributor: IntervalAttributor::new(),
            estimator: WearLifeEstimator::new(),
            scheduler: MaintenanceScheduler::new(),
            config,
            calibration,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// 执行单线路完整流程
    ///
    /// # 参数
    /// - records: 全网测量记录（按线路过滤）
    /// - input: 线路标识 + 基础设施段 + 可选线路预算
    ///
    /// # 返回
    /// - Err(EngineError): 该线路输入数据非法
    #[instrument(skip(self, records, input), fields(line_id = %input.line_id))]
    pub fn run_line(
        &self,
        records: &[MeasurementRecord],
        input: &LineInput,
    ) -> EngineResult<LineReport> {
        let line_id = input.line_id.as_str();
        info!(
            records_count = records.len(),
            infra_count = input.infrastructure.len(),
            calibration_version = %self.calibration.version(),
            "开始执行打磨排程流程"
        );

        // ==========================================
        // 步骤1: CurveSegmenter - 曲线分段
        // ==========================================
        debug!("步骤1: 执行曲线分段");

        let seg_params = &self.config.segmentation;
        let segmentation = self.segmenter.segment(
            records,
            line_id,
            seg_params.radius_min,
            seg_params.radius_max,
        )?;

        info!(
            filtered_records = segmentation.records.len(),
            segments_count = segmentation.segments.len(),
            "曲线分段完成"
        );

        // ==========================================
        // 步骤2: StatisticalAggregator - 统计聚合
        // ==========================================
        debug!("步骤2: 执行统计聚合");

        let curve_stats = self.aggregator.aggregate_segmentation(
            &segmentation,
            &self.config.aggregation,
            self.config.design_limit_mm,
        );
        let radius_profile = self.aggregator.radius_profile(&segmentation);

        // 测量里程 → 基础设施里程
        let scale = self.config.attribution.curve_position_scale;
        let profiles: Vec<CurveProfile> = self
            .aggregator
            .profiles(&segmentation, &curve_stats)
            .into_iter()
            .map(|profile| CurveProfile {
                segment: profile.segment.rescaled(scale),
                stats: profile.stats,
            })
            .collect();

        info!(
            aggregated_count = curve_stats.len(),
            dropped_count = segmentation.segments.len() - curve_stats.len(),
            "统计聚合完成"
        );

        // ==========================================
        // 步骤3: InfraCleaner - 基础设施段清洗
        // ==========================================
        debug!("步骤3: 执行基础设施段清洗");

        let infra_cleaning = self.cleaner.clean(&input.infrastructure);

        // ==========================================
        // 步骤4: IntervalAttributor - 区间挂接
        // ==========================================
        debug!("步骤4: 执行区间挂接");

        let mut attributed = self.attributor.attribute(
            &profiles,
            &infra_cleaning.segments,
            self.config.attribution.unmatched_policy,
        )?;
        let mut dominant = self
            .attributor
            .attribute_dominant(&profiles, &infra_cleaning.segments)?;

        // 下标回指原始输入
        let source = &infra_cleaning.source_indices;
        for segment in attributed.iter_mut() {
            segment.infra_index = source[segment.infra_index];
        }
        for item in dominant.iter_mut() {
            for m in item.matches.iter_mut() {
                m.infra_index = source[m.infra_index];
            }
            if let Some(d) = item.dominant.as_mut() {
                d.infra_index = source[d.infra_index];
            }
        }

        info!(
            attributed_count = attributed.len(),
            unattributed_count = attributed.iter().filter(|a| !a.is_attributed()).count(),
            "区间挂接完成"
        );

        // ==========================================
        // 步骤5: WearLifeEstimator - 剩余寿命估计
        // ==========================================
        debug!("步骤5: 执行剩余寿命估计");

        let life = self.estimator.estimate_batch(
            &attributed,
            self.config.design_limit_mm,
            &self.calibration,
            &self.config.life,
        );

        // ==========================================
        // 步骤6: MaintenanceScheduler - 打磨排程
        // ==========================================
        debug!("步骤6: 执行打磨排程");

        let mut scheduler_params = self.config.scheduler.clone();
        if let Some(budget) = input.budget {
            scheduler_params.budget = budget;
        }
        let selection = self.scheduler.schedule(&life.estimates, &scheduler_params);

        info!(
            selected_windows = selection.windows.len(),
            total_length = selection.total_length,
            leftover_budget = selection.leftover_budget,
            "打磨排程流程完成"
        );

        Ok(LineReport {
            line_id: line_id.to_string(),
            calibration_version: self.calibration.version().to_string(),
            segments: segmentation.segments,
            curve_stats,
            radius_profile,
            infra_cleaning,
            attributed,
            dominant,
            life,
            selection,
        })
    }

    /// 执行多线路流程
    ///
    /// 线路间相互独立；某条线路的数据错误记录在结果中，其余线路照常完成
    #[instrument(skip(self, records, lines), fields(lines_count = lines.len()))]
    pub fn run_network(&self, records: &[MeasurementRecord], lines: &[LineInput]) -> NetworkReport {
        let mut outcomes = BTreeMap::new();
        let mut audit = ClassificationAudit::default();

        for input in lines {
            let outcome = self.run_line(records, input);
            match &outcome {
                Ok(report) => audit.merge(&report.life.audit),
                Err(e) => warn!(line_id = %input.line_id, error = %e, "线路数据错误，跳过该线路"),
            }
            outcomes.insert(input.line_id.clone(), outcome);
        }

        let report = NetworkReport {
            lines: outcomes,
            audit,
        };
        info!(
            succeeded = report.succeeded().count(),
            failed = report.failed_lines().len(),
            "全网流程完成"
        );
        report
    }
}
