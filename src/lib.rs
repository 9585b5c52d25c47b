// ==========================================
// 钢轨打磨排程系统 - 核心库
// ==========================================
// 曲线分段 → 磨耗余量统计 → 基础设施挂接 → 剩余寿命 → 预算约束打磨排程
// 系统定位: 纯计算核心（数据导入与报表展示由外部协作方负责）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 运行参数与标定数据
pub mod config;

// 引擎层 - 计算规则
pub mod engine;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CategoryField, RailSide, UnmatchedPolicy, UrgencyBand, WavelengthBand, WindowOrigin,
};

// 领域实体
pub use domain::{
    AttributedSegment, ClassificationAudit, CurveProfile, CurveSegment, CurveStats,
    InfrastructureSegment, LifeEstimate, MaintenanceWindow, MeasurementRecord, Selection,
};

// 配置
pub use config::{Calibration, ConfigError, FrequencyTable, PipelineConfig};

// 引擎
pub use engine::{
    CurveSegmenter, EngineError, GrindingPipeline, InfraCleaner, IntervalAttributor, LineInput,
    LineReport, MaintenanceScheduler, NetworkReport, StatisticalAggregator, WearLifeEstimator,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "钢轨打磨排程系统";
