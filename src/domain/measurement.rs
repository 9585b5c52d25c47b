// ==========================================
// 钢轨打磨排程系统 - 测量记录领域模型
// ==========================================
// 数据来源: 轨检车报表（由外部导入方解析后提供）
// 红线: 测量记录不可变，引擎只读不写
// ==========================================

use crate::domain::types::{RailSide, WavelengthBand};
use serde::{Deserialize, Serialize};

// ==========================================
// DefectReading - 单通道波磨深度读数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefectReading {
    pub band: WavelengthBand,
    pub side: RailSide,
    pub depth_mm: Option<f64>, // 缺测为 None
}

// ==========================================
// MeasurementRecord - 测量记录
// ==========================================
// 固定步长区间 [von, bis)，例如 0.25 m
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub line_id: String,             // 线路标识
    pub von: f64,                    // 区间起点
    pub bis: f64,                    // 区间终点（不含）
    pub radius: Option<f64>,         // 曲线半径，可能编码为 (-1,1) 内的倒数
    pub readings: Vec<DefectReading>,
}

impl MeasurementRecord {
    /// 读取指定波长带/轨侧的深度
    ///
    /// 缺测或 NaN 均视为缺失
    pub fn depth(&self, band: WavelengthBand, side: RailSide) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.band == band && r.side == side)
            .and_then(|r| r.depth_mm)
            .filter(|d| !d.is_nan())
    }

    /// 区间长度
    pub fn length(&self) -> f64 {
        self.bis - self.von
    }
}

// ==========================================
// ChannelDefinition - 组合通道定义
// ==========================================
// 相邻波长带叠加后共同驱动同一磨耗模式，
// 例如 10-100 = 10-30 + 30-100
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDefinition {
    pub name: String,
    pub bands: Vec<WavelengthBand>,
}

impl ChannelDefinition {
    pub fn new(name: &str, bands: &[WavelengthBand]) -> Self {
        Self {
            name: name.to_string(),
            bands: bands.to_vec(),
        }
    }

    /// 计算某条记录在指定轨侧的组合值
    ///
    /// 任一组成波长带缺失则整体缺失
    pub fn value(&self, record: &MeasurementRecord, side: RailSide) -> Option<f64> {
        if self.bands.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for band in &self.bands {
            sum += record.depth(*band, side)?;
        }
        Some(sum)
    }

    /// 现场使用的三组通道: 10-100 / 30-300 / 300-1000
    pub fn standard_set() -> Vec<ChannelDefinition> {
        vec![
            ChannelDefinition::new(
                "10-100",
                &[WavelengthBand::W10To30, WavelengthBand::W30To100],
            ),
            ChannelDefinition::new(
                "30-300",
                &[WavelengthBand::W30To100, WavelengthBand::W100To300],
            ),
            ChannelDefinition::new("300-1000", &[WavelengthBand::W300To1000]),
        ]
    }
}
