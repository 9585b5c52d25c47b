// ==========================================
// 钢轨打磨排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、约束接口
// 红线: 不含引擎逻辑；各阶段输出新集合，不修改上游输入
// ==========================================

pub mod curve;
pub mod infrastructure;
pub mod life;
pub mod maintenance;
pub mod measurement;
pub mod types;

// 重导出核心类型
pub use curve::{
    ChannelStats, CurveProfile, CurveSegment, CurveStats, RadiusProfile, SegmentId, SideStats,
};
pub use infrastructure::{AttributedSegment, DominantAttribution, InfraMatch, InfrastructureSegment};
pub use life::{ClassificationAudit, LifeEstimate, UnclassifiedValue};
pub use maintenance::{BudgetConstraint, BudgetPool, MaintenanceWindow, Selection};
pub use measurement::{ChannelDefinition, DefectReading, MeasurementRecord};
pub use types::{CategoryField, RailSide, UnmatchedPolicy, UrgencyBand, WavelengthBand, WindowOrigin};
