// ==========================================
// 钢轨打磨排程系统 - 区间挂接引擎
// ==========================================
// 职责: 曲线段 × 基础设施段 区间求交，继承双方属性
// 输入: 曲线段（含统计）+ 基础设施段
// 输出: 按 (基础设施输入顺序, 曲线里程) 排序的挂接段
// 红线: 半开区间 [start, end)，仅端点相接不算重叠
// 红线: 挂接段不超出任一父区间，同一基础设施段的挂接结果在非间隙处恰好铺满
// ==========================================

use crate::domain::curve::CurveProfile;
use crate::domain::infrastructure::{
    AttributedSegment, DominantAttribution, InfraMatch, InfrastructureSegment,
};
use crate::domain::types::UnmatchedPolicy;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{debug, instrument};

// ==========================================
// IntervalAttributor - 区间挂接引擎
// ==========================================
pub struct IntervalAttributor {
    // 无状态引擎，不需要注入依赖
}

impl IntervalAttributor {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 切分挂接
    ///
    /// 每个 (曲线段, 基础设施段) 重叠对输出一段
    /// [max(curve.start, infra.start), min(curve.end, infra.end))
    ///
    /// 曲线段按起点排序后二分定位首个候选，逐个扫描至 curve.start >= infra.end
    ///
    /// # 参数
    /// - `curves`: 曲线段（互不重叠）
    /// - `infrastructure`: 基础设施段（可相互重叠，顺序即输出顺序）
    /// - `policy`: 无任何重叠时的处理策略
    ///
    /// # 返回
    /// - Err(OverlappingCurves): 曲线段相互重叠
    /// - Err(InvalidInfrastructure): 基础设施段区间非法
    #[instrument(skip(self, curves, infrastructure), fields(
        curves_count = curves.len(),
        infra_count = infrastructure.len()
    ))]
    pub fn attribute(
        &self,
        curves: &[CurveProfile],
        infrastructure: &[InfrastructureSegment],
        policy: UnmatchedPolicy,
    ) -> EngineResult<Vec<AttributedSegment>> {
        let ordered = Self::ordered_curves(curves)?;

        let mut result = Vec::new();
        let mut unmatched = 0usize;

        for (infra_index, infra) in infrastructure.iter().enumerate() {
            Self::validate_infra(infra_index, infra)?;

            // 首个 km_end > infra.start 的曲线段
            let first = ordered.partition_point(|c| c.km_end() <= infra.km_start);
            let before = result.len();

            for curve in ordered[first..]
                .iter()
                .take_while(|c| c.km_start() < infra.km_end)
            {
                let km_start = curve.km_start().max(infra.km_start);
                let km_end = curve.km_end().min(infra.km_end);
                if km_end <= km_start {
                    continue;
                }
                result.push(AttributedSegment {
                    infra_index,
                    km_start,
                    km_end,
                    curve_id: Some(curve.segment.id),
                    radius: Some(curve.segment.mean_radius),
                    wear_margin_min: Some(curve.stats.wear_margin_min).filter(|m| !m.is_nan()),
                    tie_type: infra.tie_type.clone(),
                    rail_profile: infra.rail_profile.clone(),
                    steel_grade: infra.steel_grade.clone(),
                });
            }

            if result.len() == before {
                unmatched += 1;
                if policy == UnmatchedPolicy::EmitUnattributed {
                    result.push(AttributedSegment {
                        infra_index,
                        km_start: infra.km_start,
                        km_end: infra.km_end,
                        curve_id: None,
                        radius: None,
                        wear_margin_min: None,
                        tie_type: infra.tie_type.clone(),
                        rail_profile: infra.rail_profile.clone(),
                        steel_grade: infra.steel_grade.clone(),
                    });
                }
            }
        }

        debug!(
            attributed_count = result.len(),
            unmatched_count = unmatched,
            policy = %policy,
            "区间挂接完成"
        );

        Ok(result)
    }

    /// 主导属性挂接（点查模式，不切分）
    ///
    /// 每个曲线段取重叠长度最大的基础设施段，重叠长度相同取输入顺序靠前者。
    /// 扫描线：基础设施段按起点排序，维护与当前曲线段仍可能重叠的活动集合
    #[instrument(skip(self, curves, infrastructure), fields(
        curves_count = curves.len(),
        infra_count = infrastructure.len()
    ))]
    pub fn attribute_dominant(
        &self,
        curves: &[CurveProfile],
        infrastructure: &[InfrastructureSegment],
    ) -> EngineResult<Vec<DominantAttribution>> {
        let ordered = Self::ordered_curves(curves)?;
        for (index, infra) in infrastructure.iter().enumerate() {
            Self::validate_infra(index, infra)?;
        }

        let mut by_start: Vec<usize> = (0..infrastructure.len()).collect();
        by_start.sort_by(|a, b| {
            infrastructure[*a]
                .km_start
                .total_cmp(&infrastructure[*b].km_start)
                .then(a.cmp(b))
        });

        let mut next = 0;
        let mut active: Vec<usize> = Vec::new();
        let mut result = Vec::with_capacity(ordered.len());

        for curve in &ordered {
            while next < by_start.len() && infrastructure[by_start[next]].km_start < curve.km_end() {
                active.push(by_start[next]);
                next += 1;
            }
            // 后续曲线段起点不早于当前段，已结束的基础设施段可永久移出
            active.retain(|i| infrastructure[*i].km_end > curve.km_start());

            let mut partners = active.clone();
            partners.sort_unstable();

            let matches: Vec<InfraMatch> = partners
                .into_iter()
                .map(|infra_index| {
                    let infra = &infrastructure[infra_index];
                    InfraMatch {
                        infra_index,
                        km_start: infra.km_start,
                        km_end: infra.km_end,
                        overlap: infra.overlap_with(curve.km_start(), curve.km_end()),
                        tie_type: infra.tie_type.clone(),
                        rail_profile: infra.rail_profile.clone(),
                        steel_grade: infra.steel_grade.clone(),
                    }
                })
                .filter(|m| m.overlap > 0.0)
                .collect();

            let mut dominant: Option<&InfraMatch> = None;
            for candidate in &matches {
                match dominant {
                    Some(d) if candidate.overlap <= d.overlap => {}
                    _ => dominant = Some(candidate),
                }
            }

            let dominant = dominant.cloned();
            result.push(DominantAttribution {
                curve_id: curve.segment.id,
                km_start: curve.km_start(),
                km_end: curve.km_end(),
                dominant,
                matches,
            });
        }

        Ok(result)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 按起点排序并校验互不重叠
    fn ordered_curves(curves: &[CurveProfile]) -> EngineResult<Vec<&CurveProfile>> {
        let mut ordered: Vec<&CurveProfile> = curves.iter().collect();
        ordered.sort_by(|a, b| a.km_start().total_cmp(&b.km_start()));

        for pair in ordered.windows(2) {
            if pair[1].km_start() < pair[0].km_end() {
                return Err(EngineError::OverlappingCurves {
                    first: pair[0].segment.id,
                    second: pair[1].segment.id,
                });
            }
        }
        Ok(ordered)
    }

    fn validate_infra(index: usize, infra: &InfrastructureSegment) -> EngineResult<()> {
        if !infra.km_start.is_finite() || !infra.km_end.is_finite() || infra.km_end <= infra.km_start {
            return Err(EngineError::InvalidInfrastructure {
                index,
                km_start: infra.km_start,
                km_end: infra.km_end,
            });
        }
        Ok(())
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for IntervalAttributor {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::curve::{CurveSegment, CurveStats, SideStats};
    use crate::domain::types::RailSide;

    fn curve(id: u32, start: f64, end: f64, radius: f64, margin: f64) -> CurveProfile {
        let side = SideStats {
            side: RailSide::Left,
            max_median: 0.08 - margin,
            cause_channel: "10-100".to_string(),
            wear_margin: margin,
        };
        CurveProfile {
            segment: CurveSegment {
                id,
                line_id: "L1".to_string(),
                km_start: start,
                km_end: end,
                mean_radius: radius,
                length: end - start,
                record_count: 1,
            },
            stats: CurveStats::new(id, vec![], Some(side), None),
        }
    }

    fn infra(start: f64, end: f64, tie: &str) -> InfrastructureSegment {
        InfrastructureSegment {
            km_start: start,
            km_end: end,
            tie_type: Some(tie.to_string()),
            rail_profile: None,
            steel_grade: None,
        }
    }

    #[test]
    fn test_split_across_curve_boundary() {
        let attributor = IntervalAttributor::new();
        let curves = vec![curve(1, 0.0, 5.0, 500.0, 0.01), curve(2, 5.0, 10.0, 300.0, 0.02)];
        let result = attributor
            .attribute(&curves, &[infra(2.0, 8.0, "Wood")], UnmatchedPolicy::Drop)
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!((result[0].km_start, result[0].km_end), (2.0, 5.0));
        assert_eq!(result[0].radius, Some(500.0));
        assert_eq!((result[1].km_start, result[1].km_end), (5.0, 8.0));
        assert_eq!(result[1].radius, Some(300.0));
        assert_eq!(result.iter().map(|a| a.length()).sum::<f64>(), 6.0);
        assert_eq!(result[1].tie_type.as_deref(), Some("Wood"));
    }

    #[test]
    fn test_touching_endpoints_do_not_overlap() {
        let attributor = IntervalAttributor::new();
        let curves = vec![curve(1, 0.0, 5.0, 500.0, 0.01)];
        let result = attributor
            .attribute(&curves, &[infra(5.0, 6.0, "Wood")], UnmatchedPolicy::Drop)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_unmatched_policy_emits_null_radius() {
        let attributor = IntervalAttributor::new();
        let curves = vec![curve(1, 0.0, 1.0, 500.0, 0.01)];
        let result = attributor
            .attribute(&curves, &[infra(3.0, 4.0, "Wood")], UnmatchedPolicy::EmitUnattributed)
            .unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result[0].is_attributed());
        assert_eq!(result[0].radius, None);
        assert_eq!((result[0].km_start, result[0].km_end), (3.0, 4.0));
    }

    #[test]
    fn test_overlapping_curves_rejected() {
        let attributor = IntervalAttributor::new();
        let curves = vec![curve(1, 0.0, 5.0, 500.0, 0.01), curve(2, 4.0, 10.0, 300.0, 0.02)];
        let err = attributor
            .attribute(&curves, &[infra(0.0, 1.0, "Wood")], UnmatchedPolicy::Drop)
            .unwrap_err();
        assert_eq!(err, EngineError::OverlappingCurves { first: 1, second: 2 });
    }

    #[test]
    fn test_dominant_by_overlap_then_input_order() {
        let attributor = IntervalAttributor::new();
        let curves = vec![curve(1, 0.0, 4.0, 500.0, 0.01)];
        let infrastructure = vec![
            infra(0.0, 1.0, "Wood"),
            infra(1.0, 2.5, "Concrete"),
            infra(2.5, 4.0, "Steel"),
        ];
        let result = attributor.attribute_dominant(&curves, &infrastructure).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].matches.len(), 3);
        let dominant = result[0].dominant.as_ref().unwrap();
        // 1.5 与 1.5 并列，取输入靠前者
        assert_eq!(dominant.infra_index, 1);
        assert_eq!(dominant.tie_type.as_deref(), Some("Concrete"));
    }

    #[test]
    fn test_dominant_without_partner() {
        let attributor = IntervalAttributor::new();
        let curves = vec![curve(1, 0.0, 1.0, 500.0, 0.01), curve(2, 5.0, 6.0, 300.0, 0.01)];
        let result = attributor
            .attribute_dominant(&curves, &[infra(0.5, 2.0, "Wood")])
            .unwrap();
        assert_eq!(result[0].dominant.as_ref().map(|d| d.infra_index), Some(0));
        assert!(result[1].dominant.is_none());
        assert!(result[1].matches.is_empty());
    }
}
