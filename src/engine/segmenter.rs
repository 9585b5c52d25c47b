// ==========================================
// 钢轨打磨排程系统 - 曲线分段引擎
// ==========================================
// 职责: 按线路/半径窗口过滤测量记录，以变点规则切分曲线段
// 输入: 按里程排序的测量记录
// 输出: 有序曲线段 + 每段对应的记录切片
// 红线: 分段必须顺序执行（每条记录只与前一条比较），不可并行
// ==========================================

use crate::domain::curve::{CurveSegment, SegmentId};
use crate::domain::measurement::MeasurementRecord;
use crate::engine::error::{EngineError, EngineResult};
use std::ops::Range;
use tracing::{debug, instrument, warn};

// ==========================================
// Segmentation - 分段结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub line_id: String,
    /// 过滤并解码半径后的记录（按里程排序）
    pub records: Vec<MeasurementRecord>,
    pub segments: Vec<CurveSegment>,
    ranges: Vec<Range<usize>>,
}

impl Segmentation {
    fn empty(line_id: &str) -> Self {
        Self {
            line_id: line_id.to_string(),
            records: Vec::new(),
            segments: Vec::new(),
            ranges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// 按段遍历 (曲线段, 该段记录)
    pub fn groups(&self) -> impl Iterator<Item = (&CurveSegment, &[MeasurementRecord])> + '_ {
        self.segments
            .iter()
            .zip(self.ranges.iter())
            .map(move |(segment, range)| (segment, &self.records[range.clone()]))
    }

    /// 取指定段的记录
    pub fn records_of(&self, id: SegmentId) -> Option<&[MeasurementRecord]> {
        self.segments
            .iter()
            .position(|s| s.id == id)
            .map(|idx| &self.records[self.ranges[idx].clone()])
    }

    /// 过滤后记录覆盖的里程范围 [min(von), max(bis))
    pub fn covered_range(&self) -> Option<(f64, f64)> {
        let first = self.segments.first()?;
        let last = self.segments.last()?;
        Some((first.km_start, last.km_end))
    }
}

// ==========================================
// CurveSegmenter - 曲线分段引擎
// ==========================================
pub struct CurveSegmenter {
    // 无状态引擎，不需要注入依赖
}

impl CurveSegmenter {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 曲线分段
    ///
    /// 规则：
    /// 1) 只保留 line_id 匹配的记录
    /// 2) 半径先解码（见 `decode_radius`），再按 [radius_min, radius_max] 过滤
    /// 3) 解码半径与前一条保留记录不同即开启新段（变点规则，不做阈值/聚类）
    /// 4) 每段: km_start = min(von), km_end = max(bis), 半径取均值
    ///
    /// # 参数
    /// - `records`: 测量记录（按里程排序）
    /// - `line_id`: 线路标识
    /// - `radius_min` / `radius_max`: 半径窗口（含端点）
    ///
    /// # 返回
    /// - Ok(Segmentation): 过滤后为空时返回空结果（非错误）
    /// - Err(EngineError): 该线路记录区间非法或未排序
    #[instrument(skip(self, records), fields(records_count = records.len()))]
    pub fn segment(
        &self,
        records: &[MeasurementRecord],
        line_id: &str,
        radius_min: f64,
        radius_max: f64,
    ) -> EngineResult<Segmentation> {
        // 1. 线路过滤 + 数据校验（校验作用于整条线路，而非仅半径窗口内）
        let mut line_records: Vec<&MeasurementRecord> = Vec::new();
        let mut previous_von: Option<f64> = None;
        for (index, record) in records.iter().enumerate() {
            if record.line_id != line_id {
                continue;
            }
            Self::validate_record(record, index)?;
            if let Some(prev) = previous_von {
                if record.von < prev {
                    return Err(EngineError::UnorderedPositions {
                        line_id: line_id.to_string(),
                        index,
                        von: record.von,
                        previous_von: prev,
                    });
                }
            }
            previous_von = Some(record.von);
            line_records.push(record);
        }

        // 2. 半径解码 + 半径窗口过滤
        let filtered: Vec<MeasurementRecord> = line_records
            .into_iter()
            .filter_map(|record| {
                let radius = record.radius.filter(|r| !r.is_nan()).map(Self::decode_radius)?;
                if radius >= radius_min && radius <= radius_max {
                    Some(MeasurementRecord {
                        radius: Some(radius),
                        ..record.clone()
                    })
                } else {
                    None
                }
            })
            .collect();

        if filtered.is_empty() {
            warn!(line_id, "半径窗口内无测量记录，返回空分段");
            return Ok(Segmentation::empty(line_id));
        }

        // 3. 变点切分
        let ranges = Self::change_points(&filtered);

        // 4. 段级汇总
        let segments: Vec<CurveSegment> = ranges
            .iter()
            .enumerate()
            .map(|(idx, range)| Self::summarise(line_id, idx as SegmentId + 1, &filtered[range.clone()]))
            .collect();

        debug!(
            line_id,
            filtered_count = filtered.len(),
            segments_count = segments.len(),
            "曲线分段完成"
        );

        Ok(Segmentation {
            line_id: line_id.to_string(),
            records: filtered,
            segments,
            ranges,
        })
    }

    /// 半径解码
    ///
    /// 上游报表可能以倒数形式编码半径：(-1,1) 内的非零值取 round(1/x)，
    /// 其余值原样返回
    pub fn decode_radius(value: f64) -> f64 {
        if value > -1.0 && value < 1.0 && value != 0.0 {
            (1.0 / value).round_ties_even()
        } else {
            value
        }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn validate_record(record: &MeasurementRecord, index: usize) -> EngineResult<()> {
        if !record.von.is_finite() || !record.bis.is_finite() || record.bis <= record.von {
            return Err(EngineError::InvalidInterval {
                line_id: record.line_id.clone(),
                index,
                von: record.von,
                bis: record.bis,
            });
        }
        // NaN 视为缺测；无穷值视为损坏数据
        if let Some(bad) = record
            .readings
            .iter()
            .filter_map(|r| r.depth_mm)
            .find(|d| d.is_infinite())
        {
            return Err(EngineError::InvalidReading {
                line_id: record.line_id.clone(),
                index,
                value: bad,
            });
        }
        Ok(())
    }

    /// 变点：半径与前一条不同即切分
    fn change_points(records: &[MeasurementRecord]) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        for i in 1..records.len() {
            if records[i].radius != records[i - 1].radius {
                ranges.push(start..i);
                start = i;
            }
        }
        ranges.push(start..records.len());
        ranges
    }

    fn summarise(line_id: &str, id: SegmentId, run: &[MeasurementRecord]) -> CurveSegment {
        let km_start = run.iter().map(|r| r.von).fold(f64::INFINITY, f64::min);
        let km_end = run.iter().map(|r| r.bis).fold(f64::NEG_INFINITY, f64::max);
        let radius_sum: f64 = run.iter().filter_map(|r| r.radius).sum();

        CurveSegment {
            id,
            line_id: line_id.to_string(),
            km_start,
            km_end,
            mean_radius: radius_sum / run.len() as f64,
            length: km_end - km_start,
            record_count: run.len(),
        }
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for CurveSegmenter {
    fn default() -> Self {
        Self::new()
    }
}
