// ==========================================
// WearLifeEstimator 引擎集成测试
// ==========================================
// 测试目标: 标准单元编码 + 频率查表 + 剩余年限
// 覆盖范围: 反比关系、零频率、标定表版本、未识别类别审计
// ==========================================

use rail_grinding_planner::config::{Calibration, FrequencyTable, LifeParams};
use rail_grinding_planner::domain::infrastructure::AttributedSegment;
use rail_grinding_planner::domain::types::{CategoryField, UrgencyBand};
use rail_grinding_planner::engine::WearLifeEstimator;
use std::collections::BTreeMap;

const DESIGN_LIMIT: f64 = 0.08;

fn attributed(radius: Option<f64>, margin: Option<f64>, tie: &str, rail: &str) -> AttributedSegment {
    AttributedSegment {
        infra_index: 0,
        km_start: 10.0,
        km_end: 10.4,
        curve_id: margin.map(|_| 3),
        radius,
        wear_margin_min: margin,
        tie_type: Some(tie.to_string()),
        rail_profile: Some(rail.to_string()),
        steel_grade: Some("R 350 HT".to_string()),
    }
}

fn calibration(entries: &[(&str, f64)]) -> Calibration {
    Calibration {
        classification: Default::default(),
        frequencies: FrequencyTable {
            version: "test".to_string(),
            default_frequency: 0.14,
            entries: entries
                .iter()
                .map(|(code, freq)| (code.to_string(), *freq))
                .collect::<BTreeMap<_, _>>(),
        },
    }
}

#[test]
fn test_doubling_frequency_halves_years() {
    let estimator = WearLifeEstimator::new();
    let segment = attributed(Some(280.0), Some(0.03), "Concrete", "46 E1");
    let params = LifeParams::default();

    let base = estimator.estimate_life(&segment, DESIGN_LIMIT, &calibration(&[("31312211", 0.1)]), &params);
    let doubled = estimator.estimate_life(&segment, DESIGN_LIMIT, &calibration(&[("31312211", 0.2)]), &params);

    assert_eq!(base.element_code, "31312211");
    assert!(base.frequency_from_table);
    let base_years = base.years_to_threshold.unwrap();
    let doubled_years = doubled.years_to_threshold.unwrap();
    assert!((base_years - 3.75).abs() < 1e-9);
    assert!((doubled_years * 2.0 - base_years).abs() < 1e-9);
}

#[test]
fn test_builtin_table_zero_frequency_never_divides() {
    let estimator = WearLifeEstimator::new();
    // 半径 > 600 → '1'，Concrete/46 E1/R 350 HT → 31112211，观测频率 0
    let segment = attributed(Some(800.0), Some(0.01), "Concrete", "46 E1");

    let estimate = estimator.estimate_life(
        &segment,
        DESIGN_LIMIT,
        &Calibration::builtin(),
        &LifeParams::default(),
    );

    assert_eq!(estimate.element_code, "31112211");
    assert_eq!(estimate.annual_frequency, 0.0);
    assert!(estimate.no_wear_progression);
    let years = estimate.years_to_threshold.unwrap();
    assert!(years.is_finite());
    assert_eq!(years, 9999.0);
    assert_eq!(estimate.urgency, UrgencyBand::Sound);
}

#[test]
fn test_builtin_zero_frequency_past_limit_is_overdue() {
    let estimator = WearLifeEstimator::new();
    // 300 < R <= 600 → '2'，31212211 观测频率 0，但磨耗已超限
    let segment = attributed(Some(450.0), Some(-0.03), "Concrete", "46 E1");

    let estimate = estimator.estimate_life(
        &segment,
        DESIGN_LIMIT,
        &Calibration::builtin(),
        &LifeParams::default(),
    );

    assert_eq!(estimate.element_code, "31212211");
    assert_eq!(estimate.annual_frequency, 0.0);
    assert!(estimate.no_wear_progression);
    assert_eq!(estimate.years_to_threshold, Some(-9999.0));
    assert_eq!(estimate.urgency, UrgencyBand::Overdue);
}

#[test]
fn test_urgency_bands_follow_years() {
    let estimator = WearLifeEstimator::new();
    let table = calibration(&[("31312211", 0.5)]);
    let params = LifeParams::default();
    let band = |margin: f64| {
        estimator
            .estimate_life(&attributed(Some(250.0), Some(margin), "Concrete", "46 E1"), DESIGN_LIMIT, &table, &params)
            .urgency
    };

    // years = margin / 0.04
    assert_eq!(band(-0.01), UrgencyBand::Overdue);
    assert_eq!(band(0.0), UrgencyBand::Overdue);
    assert_eq!(band(0.02), UrgencyBand::DueWithinYear);
    assert_eq!(band(0.05), UrgencyBand::Sound);
}

#[test]
fn test_unclassified_categories_are_audited() {
    let estimator = WearLifeEstimator::new();
    let segments = vec![
        attributed(Some(250.0), Some(0.02), "Plastic", "60 E1"),
        attributed(None, None, "Plastic", "46 E1"),
        attributed(Some(250.0), Some(0.02), "Wood", "46 E1"),
    ];

    let assessment = estimator.estimate_batch(
        &segments,
        DESIGN_LIMIT,
        &Calibration::builtin(),
        &LifeParams::default(),
    );

    assert_eq!(assessment.estimates[0].element_code, "313FE211");
    assert_eq!(assessment.audit.count(CategoryField::TieType, "Plastic"), 2);
    assert_eq!(assessment.audit.count(CategoryField::RailProfile, "60 E1"), 1);
    assert_eq!(assessment.audit.count(CategoryField::Radius, "<missing>"), 1);
    assert_eq!(assessment.audit.total(), 4);
    // 313FE211 / 31FF2211 均不在表内
    assert_eq!(assessment.default_frequency_count, 2);
    assert_eq!(assessment.estimates[1].urgency, UrgencyBand::Unknown);
}
