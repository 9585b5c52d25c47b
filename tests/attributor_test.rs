// ==========================================
// IntervalAttributor 引擎集成测试
// ==========================================
// 测试目标: 曲线段 × 基础设施段 区间求交
// 覆盖范围: 跨边界切分、铺满不变量、无重叠策略、主导属性
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use rail_grinding_planner::config::AggregationParams;
use rail_grinding_planner::domain::curve::CurveProfile;
use rail_grinding_planner::domain::types::UnmatchedPolicy;
use rail_grinding_planner::engine::{CurveSegmenter, IntervalAttributor, StatisticalAggregator};

/// 由半径序列构造曲线段（单位长度记录）
fn curves_from_radii(radii: &[f64], step: f64) -> Vec<CurveProfile> {
    let records = records_with_radii("L1", 0.0, step, radii, 0.01);
    let segmentation = CurveSegmenter::new()
        .segment(&records, "L1", 10.0, 600.0)
        .unwrap();
    let aggregator = StatisticalAggregator::new();
    let stats = aggregator.aggregate_segmentation(&segmentation, &AggregationParams::default(), 0.08);
    aggregator.profiles(&segmentation, &stats)
}

#[test]
fn test_infra_spanning_two_curves_is_split() {
    // [0,5) 半径 500，[5,10) 半径 300
    let curves = curves_from_radii(&[500.0, 300.0], 5.0);
    let infrastructure = vec![InfraBuilder::new(2.0, 8.0).tie("Wood").build()];

    let result = IntervalAttributor::new()
        .attribute(&curves, &infrastructure, UnmatchedPolicy::Drop)
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!((result[0].km_start, result[0].km_end), (2.0, 5.0));
    assert_eq!(result[0].radius, Some(500.0));
    assert_eq!((result[1].km_start, result[1].km_end), (5.0, 8.0));
    assert_eq!(result[1].radius, Some(300.0));
    let total: f64 = result.iter().map(|a| a.length()).sum();
    assert_eq!(total, infrastructure[0].length());
    assert!(result.iter().all(|a| a.tie_type.as_deref() == Some("Wood")));
}

#[test]
fn test_attributed_pieces_stay_within_both_parents() {
    let curves = curves_from_radii(&[500.0, 500.0, 300.0, 250.0, 250.0, 250.0, 400.0], 1.0);
    let infrastructure = vec![
        InfraBuilder::new(0.5, 3.2).build(),
        InfraBuilder::new(3.2, 6.9).tie("Steel").build(),
        InfraBuilder::new(1.0, 1.5).build(),
    ];

    let result = IntervalAttributor::new()
        .attribute(&curves, &infrastructure, UnmatchedPolicy::Drop)
        .unwrap();

    for piece in &result {
        let infra = &infrastructure[piece.infra_index];
        let curve = curves
            .iter()
            .find(|c| Some(c.segment.id) == piece.curve_id)
            .unwrap();
        assert!(piece.km_start >= infra.km_start && piece.km_end <= infra.km_end);
        assert!(piece.km_start >= curve.km_start() && piece.km_end <= curve.km_end());
        assert!(piece.length() > 0.0);
    }

    // 曲线覆盖 [0,7)，每个基础设施段被完整铺满
    for (index, infra) in infrastructure.iter().enumerate() {
        let covered: f64 = result
            .iter()
            .filter(|a| a.infra_index == index)
            .map(|a| a.length())
            .sum();
        assert!((covered - infra.length()).abs() < 1e-9);
    }

    // 输出顺序: 基础设施输入顺序优先
    let order: Vec<usize> = result.iter().map(|a| a.infra_index).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn test_gap_without_curve_follows_policy() {
    let curves = curves_from_radii(&[500.0, 300.0], 1.0);
    let infrastructure = vec![
        InfraBuilder::new(0.0, 2.0).build(),
        InfraBuilder::new(10.0, 12.0).build(),
    ];
    let attributor = IntervalAttributor::new();

    let dropped = attributor
        .attribute(&curves, &infrastructure, UnmatchedPolicy::Drop)
        .unwrap();
    assert!(dropped.iter().all(|a| a.infra_index == 0));

    let emitted = attributor
        .attribute(&curves, &infrastructure, UnmatchedPolicy::EmitUnattributed)
        .unwrap();
    let orphan = emitted.iter().find(|a| a.infra_index == 1).unwrap();
    assert_eq!(orphan.curve_id, None);
    assert_eq!(orphan.radius, None);
    assert_eq!(orphan.wear_margin_min, None);
    assert_eq!(orphan.length(), 2.0);
}

#[test]
fn test_dominant_partner_per_curve() {
    let curves = curves_from_radii(&[500.0, 300.0], 5.0);
    let infrastructure = vec![
        InfraBuilder::new(0.0, 4.0).tie("Wood").build(),
        InfraBuilder::new(4.0, 10.0).tie("Concrete").build(),
    ];

    let result = IntervalAttributor::new()
        .attribute_dominant(&curves, &infrastructure)
        .unwrap();

    assert_eq!(result.len(), 2);
    // 曲线 [0,5): Wood 4.0 vs Concrete 1.0
    let first = result[0].dominant.as_ref().unwrap();
    assert_eq!(first.tie_type.as_deref(), Some("Wood"));
    assert_eq!(result[0].matches.len(), 2);
    // 曲线 [5,10): 仅 Concrete
    let second = result[1].dominant.as_ref().unwrap();
    assert_eq!(second.infra_index, 1);
    assert_eq!(second.overlap, 5.0);
    assert_eq!(result[1].matches.len(), 1);
}
