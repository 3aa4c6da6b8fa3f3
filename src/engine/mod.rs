// ==========================================
// 精整线时序合成 - 引擎层
// ==========================================
// 职责: 事实构建 / 设备拓扑 / 班组轮转 / 时长模型 / 时间线合成 / 事件日志
// 红线: 合成时间由完工时间反推, 随机源只通过 DurationSampler 注入
// ==========================================

pub mod coil_fact;
pub mod crew_rotation;
pub mod duration;
pub mod error;
pub mod event_log;
pub mod gap_cleaner;
pub mod maintenance_fact;
pub mod operation_synth;
pub mod orchestrator;
pub mod topology;

// 重导出核心引擎
pub use coil_fact::{CoilFactBuild, CoilFactBuilder};
pub use crew_rotation::CrewSchedule;
pub use duration::{DurationModel, DurationSampler, FixedDurationSampler, RandomDurationSampler};
pub use error::{EngineError, EngineResult};
pub use event_log::{EventLogBuild, EventLogBuilder};
pub use gap_cleaner::{GapCleaner, GapCleaningReport};
pub use maintenance_fact::{MaintenanceFactBuild, MaintenanceFactBuilder};
pub use operation_synth::{anchor_timeline, AnchoredTimeline, CoilWindow, OperationSynthesis, OperationSynthesizer};
pub use orchestrator::{PipelineOutput, PipelineRunner, PipelineSummary};
pub use topology::LineTopology;
