// ==========================================
// 钢轨打磨排程系统 - 剩余寿命领域模型
// ==========================================
// years_to_threshold = wear_margin_min / (design_limit × annual_frequency)
// ==========================================

use crate::domain::infrastructure::AttributedSegment;
use crate::domain::types::{CategoryField, UrgencyBand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// UnclassifiedValue - 未识别类别
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnclassifiedValue {
    pub field: CategoryField,
    pub value: Option<String>, // None 表示缺失
}

// ==========================================
// LifeEstimate - 剩余寿命估计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEstimate {
    pub segment: AttributedSegment,
    pub element_code: String,      // 8 位标准单元编码
    pub annual_frequency: f64,     // 年增长频率
    pub frequency_from_table: bool, // false = 使用缺省频率
    pub years_to_threshold: Option<f64>, // 无磨耗余量时为 None
    pub no_wear_progression: bool, // 频率为 0，years 为哨兵值
    pub urgency: UrgencyBand,
    pub unclassified: Vec<UnclassifiedValue>,
}

impl LifeEstimate {
    pub fn km_start(&self) -> f64 {
        self.segment.km_start
    }

    pub fn km_end(&self) -> f64 {
        self.segment.km_end
    }

    pub fn length(&self) -> f64 {
        self.segment.length()
    }
}

// ==========================================
// ClassificationAudit - 未识别类别审计
// ==========================================
// 字段 → 原始取值 → 出现次数（缺失值记为 "<missing>"）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationAudit {
    pub counts: BTreeMap<CategoryField, BTreeMap<String, usize>>,
}

impl ClassificationAudit {
    pub const MISSING_KEY: &'static str = "<missing>";

    pub fn record(&mut self, unclassified: &UnclassifiedValue) {
        let key = unclassified
            .value
            .clone()
            .unwrap_or_else(|| Self::MISSING_KEY.to_string());
        *self
            .counts
            .entry(unclassified.field)
            .or_default()
            .entry(key)
            .or_insert(0) += 1;
    }

    pub fn count(&self, field: CategoryField, value: &str) -> usize {
        self.counts
            .get(&field)
            .and_then(|values| values.get(value))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().flat_map(|values| values.values()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// 合并另一份审计（多线路汇总）
    pub fn merge(&mut self, other: &ClassificationAudit) {
        for (field, values) in &other.counts {
            let target = self.counts.entry(*field).or_default();
            for (value, count) in values {
                *target.entry(value.clone()).or_insert(0) += count;
            }
        }
    }
}
