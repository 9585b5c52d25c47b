// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================
#![allow(dead_code)]

use rail_grinding_planner::domain::infrastructure::{AttributedSegment, InfrastructureSegment};
use rail_grinding_planner::domain::life::LifeEstimate;
use rail_grinding_planner::domain::measurement::{DefectReading, MeasurementRecord};
use rail_grinding_planner::domain::types::{RailSide, UrgencyBand, WavelengthBand};

pub const ALL_BANDS: [WavelengthBand; 4] = [
    WavelengthBand::W10To30,
    WavelengthBand::W30To100,
    WavelengthBand::W100To300,
    WavelengthBand::W300To1000,
];

// ==========================================
// MeasurementRecord 构建器
// ==========================================

pub struct RecordBuilder {
    line_id: String,
    von: f64,
    bis: f64,
    radius: Option<f64>,
    readings: Vec<DefectReading>,
}

impl RecordBuilder {
    pub fn new(line_id: &str, von: f64, bis: f64) -> Self {
        Self {
            line_id: line_id.to_string(),
            von,
            bis,
            radius: None,
            readings: Vec::new(),
        }
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn depth(mut self, band: WavelengthBand, side: RailSide, depth_mm: f64) -> Self {
        self.readings.retain(|r| !(r.band == band && r.side == side));
        self.readings.push(DefectReading {
            band,
            side,
            depth_mm: Some(depth_mm),
        });
        self
    }

    pub fn missing(mut self, band: WavelengthBand, side: RailSide) -> Self {
        self.readings.retain(|r| !(r.band == band && r.side == side));
        self.readings.push(DefectReading {
            band,
            side,
            depth_mm: None,
        });
        self
    }

    /// 所有波长带、两侧均为同一深度
    pub fn uniform_depth(mut self, depth_mm: f64) -> Self {
        for side in RailSide::ALL {
            for band in ALL_BANDS {
                self = self.depth(band, side, depth_mm);
            }
        }
        self
    }

    pub fn build(self) -> MeasurementRecord {
        MeasurementRecord {
            line_id: self.line_id,
            von: self.von,
            bis: self.bis,
            radius: self.radius,
            readings: self.readings,
        }
    }
}

/// 连续等步长记录，半径序列逐条指定，深度统一
pub fn records_with_radii(
    line_id: &str,
    start: f64,
    step: f64,
    radii: &[f64],
    depth_mm: f64,
) -> Vec<MeasurementRecord> {
    radii
        .iter()
        .enumerate()
        .map(|(i, radius)| {
            let von = start + step * i as f64;
            RecordBuilder::new(line_id, von, von + step)
                .radius(*radius)
                .uniform_depth(depth_mm)
                .build()
        })
        .collect()
}

// ==========================================
// InfrastructureSegment 构建器
// ==========================================

pub struct InfraBuilder {
    segment: InfrastructureSegment,
}

impl InfraBuilder {
    pub fn new(km_start: f64, km_end: f64) -> Self {
        Self {
            segment: InfrastructureSegment {
                km_start,
                km_end,
                tie_type: Some("Concrete".to_string()),
                rail_profile: Some("54 E2".to_string()),
                steel_grade: Some("R 260".to_string()),
            },
        }
    }

    pub fn tie(mut self, tie: &str) -> Self {
        self.segment.tie_type = Some(tie.to_string());
        self
    }

    pub fn rail(mut self, rail: &str) -> Self {
        self.segment.rail_profile = Some(rail.to_string());
        self
    }

    pub fn steel(mut self, steel: Option<&str>) -> Self {
        self.segment.steel_grade = steel.map(str::to_string);
        self
    }

    pub fn build(self) -> InfrastructureSegment {
        self.segment
    }
}

// ==========================================
// LifeEstimate 构建器
// ==========================================

pub fn life_estimate(km_start: f64, km_end: f64, years: Option<f64>) -> LifeEstimate {
    LifeEstimate {
        segment: AttributedSegment {
            infra_index: 0,
            km_start,
            km_end,
            curve_id: Some(1),
            radius: Some(300.0),
            wear_margin_min: Some(0.0),
            tie_type: Some("Concrete".to_string()),
            rail_profile: Some("54 E2".to_string()),
            steel_grade: Some("R 260".to_string()),
        },
        element_code: "31311111".to_string(),
        annual_frequency: 0.15,
        frequency_from_table: false,
        years_to_threshold: years,
        no_wear_progression: false,
        urgency: UrgencyBand::from_years(years),
        unclassified: vec![],
    }
}
