// ==========================================
// 钢轨打磨排程系统 - 引擎层
// ==========================================
// 职责: 五个无状态计算引擎 + 清洗器 + 编排器
// 红线: 引擎只读输入、返回新集合；不做 I/O，不持有可变全局状态
// ==========================================

pub mod aggregator;
pub mod attributor;
pub mod error;
pub mod infra_cleaner;
pub mod orchestrator;
pub mod scheduler;
pub mod segmenter;
pub mod stats;
pub mod wear_life;

// 重导出核心引擎
pub use aggregator::StatisticalAggregator;
pub use attributor::IntervalAttributor;
pub use error::{EngineError, EngineResult};
pub use infra_cleaner::{InfraCleaner, InfraCleaning, InfraRejection, RejectReason};
pub use orchestrator::{GrindingPipeline, LineInput, LineReport, NetworkReport};
pub use scheduler::MaintenanceScheduler;
pub use segmenter::{CurveSegmenter, Segmentation};
pub use wear_life::{LifeAssessment, WearLifeEstimator};
