// ==========================================
// 钢轨打磨排程系统 - 引擎层错误类型
// ==========================================
// 仅数据错误（DataError）上抛，作用域为单条线路
// 其余可恢复情形（退化统计/无重叠/未识别类别/零频率/预算不足）在本地以哨兵值消解
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineError {
    // ===== 测量记录 =====
    #[error("测量区间非法 (线路 {line_id}, 记录 {index}): von={von}, bis={bis}")]
    InvalidInterval {
        line_id: String,
        index: usize,
        von: f64,
        bis: f64,
    },

    #[error("测量记录未按里程排序 (线路 {line_id}, 记录 {index}): von={von} < 前一条 von={previous_von}")]
    UnorderedPositions {
        line_id: String,
        index: usize,
        von: f64,
        previous_von: f64,
    },

    #[error("波磨读数非法 (线路 {line_id}, 记录 {index}): {value}")]
    InvalidReading {
        line_id: String,
        index: usize,
        value: f64,
    },

    // ===== 曲线分区 =====
    #[error("曲线段相互重叠 (段 {first} 与段 {second})")]
    OverlappingCurves { first: u32, second: u32 },

    // ===== 基础设施段 =====
    #[error("基础设施段区间非法 (下标 {index}): km_start={km_start}, km_end={km_end}")]
    InvalidInfrastructure {
        index: usize,
        km_start: f64,
        km_end: f64,
    },
}

impl EngineError {
    /// 受影响的线路（若可确定）
    pub fn line_id(&self) -> Option<&str> {
        match self {
            EngineError::InvalidInterval { line_id, .. }
            | EngineError::UnorderedPositions { line_id, .. }
            | EngineError::InvalidReading { line_id, .. } => Some(line_id),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
