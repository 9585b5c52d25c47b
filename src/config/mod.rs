// ==========================================
// 钢轨打磨排程系统 - 配置层
// ==========================================
// 职责: 运行参数 + 版本化标定数据（频率表/分类规则）
// 存储: JSON / CSV 文件，由外部提供
// ==========================================

pub mod calibration;
pub mod error;
pub mod pipeline_config;

// 重导出核心配置
pub use calibration::{
    Calibration, CategoryRule, ClassificationRules, CodeDigit, FrequencyTable, MatchPattern,
    RadiusBucket, ELEMENT_CODE_LEN,
};
pub use error::{ConfigError, ConfigResult};
pub use pipeline_config::{
    AggregationParams, AttributionParams, LifeParams, PipelineConfig, SchedulerParams,
    SegmentationParams,
};
