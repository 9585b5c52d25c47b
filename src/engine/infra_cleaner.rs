// ==========================================
// 钢轨打磨排程系统 - 基础设施段清洗器
// ==========================================
// 职责: 区间标准化 / 长度校验 / 轨型别名归一 / 去重
// 红线: 清洗不抛错，被剔除的行逐条记录原因，交由调用方审计
// ==========================================

use crate::domain::infrastructure::InfrastructureSegment;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{instrument, warn};

// ==========================================
// RejectReason - 剔除原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    NonFiniteBound,
    NonPositiveLength,
    ExceedsMaxLength,
    Duplicate,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NonFiniteBound => write!(f, "NON_FINITE_BOUND"),
            RejectReason::NonPositiveLength => write!(f, "NON_POSITIVE_LENGTH"),
            RejectReason::ExceedsMaxLength => write!(f, "EXCEEDS_MAX_LENGTH"),
            RejectReason::Duplicate => write!(f, "DUPLICATE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraRejection {
    pub index: usize, // 原始输入下标
    pub km_start: f64,
    pub km_end: f64,
    pub reason: RejectReason,
}

// ==========================================
// InfraCleaning - 清洗结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraCleaning {
    pub segments: Vec<InfrastructureSegment>,
    pub source_indices: Vec<usize>, // 与 segments 一一对应的原始下标
    pub swapped_count: usize,       // 起止颠倒后被交换的行数
    pub rejections: Vec<InfraRejection>,
}

// ==========================================
// InfraCleaner - 基础设施段清洗器
// ==========================================
pub struct InfraCleaner {
    max_segment_length: Option<f64>, // None 不限长度
    rail_profile_aliases: BTreeMap<String, String>,
}

// 去重键: 起止里程位模式 + 三项属性
type RowKey = (u64, u64, Option<String>, Option<String>, Option<String>);

impl InfraCleaner {
    pub fn new(
        max_segment_length: Option<f64>,
        rail_profile_aliases: BTreeMap<String, String>,
    ) -> Self {
        Self {
            max_segment_length,
            rail_profile_aliases,
        }
    }

    /// 清洗基础设施段
    ///
    /// 步骤：
    /// 1) 文本字段 TRIM，空串视为缺失
    /// 2) 起止颠倒则交换
    /// 3) 非有限值 / 长度 ≤ 0 / 长度 > 上限（若配置）→ 剔除
    /// 4) 轨型别名归一
    /// 5) 完全相同的行只保留第一条
    #[instrument(skip(self, segments), fields(input_count = segments.len()))]
    pub fn clean(&self, segments: &[InfrastructureSegment]) -> InfraCleaning {
        let mut kept: Vec<InfrastructureSegment> = Vec::with_capacity(segments.len());
        let mut seen: BTreeSet<RowKey> = BTreeSet::new();
        let mut source_indices = Vec::with_capacity(segments.len());
        let mut rejections = Vec::new();
        let mut swapped_count = 0;

        for (index, raw) in segments.iter().enumerate() {
            let reject = |reason| InfraRejection {
                index,
                km_start: raw.km_start,
                km_end: raw.km_end,
                reason,
            };

            if !raw.km_start.is_finite() || !raw.km_end.is_finite() {
                rejections.push(reject(RejectReason::NonFiniteBound));
                continue;
            }

            let (km_start, km_end) = if raw.km_end < raw.km_start {
                swapped_count += 1;
                (raw.km_end, raw.km_start)
            } else {
                (raw.km_start, raw.km_end)
            };

            let length = km_end - km_start;
            if length <= 0.0 {
                rejections.push(reject(RejectReason::NonPositiveLength));
                continue;
            }
            if self.max_segment_length.is_some_and(|max| length > max) {
                rejections.push(reject(RejectReason::ExceedsMaxLength));
                continue;
            }

            let cleaned = InfrastructureSegment {
                km_start,
                km_end,
                tie_type: Self::normalize_null(raw.tie_type.as_deref()),
                rail_profile: Self::normalize_null(raw.rail_profile.as_deref())
                    .map(|p| self.resolve_alias(p)),
                steel_grade: Self::normalize_null(raw.steel_grade.as_deref()),
            };

            if !seen.insert(Self::row_key(&cleaned)) {
                rejections.push(reject(RejectReason::Duplicate));
                continue;
            }

            kept.push(cleaned);
            source_indices.push(index);
        }

        if !rejections.is_empty() {
            warn!(
                rejected_count = rejections.len(),
                kept_count = kept.len(),
                "部分基础设施段在清洗中被剔除"
            );
        }

        InfraCleaning {
            segments: kept,
            source_indices,
            swapped_count,
            rejections,
        }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn row_key(segment: &InfrastructureSegment) -> RowKey {
        // +0.0 使 -0.0 与 0.0 同键
        (
            (segment.km_start + 0.0).to_bits(),
            (segment.km_end + 0.0).to_bits(),
            segment.tie_type.clone(),
            segment.rail_profile.clone(),
            segment.steel_grade.clone(),
        )
    }

    fn normalize_null(value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn resolve_alias(&self, profile: String) -> String {
        match self.rail_profile_aliases.get(&profile) {
            Some(canonical) => canonical.clone(),
            None => profile,
        }
    }
}
