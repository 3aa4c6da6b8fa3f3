// ==========================================
// 精整线时序合成 - 核心库
// ==========================================
// 输入: MES 生产完工导出 + 设备检修停机导出
// 输出: 星型模型 CSV（设备/班组维度, 生产/检修/工序/事件事实）
// 核心: 以 MES 完工时间为锚, 反推逐工序作业时间线
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 维度与事实记录
pub mod domain;

// 配置层 - 运行参数与产线配置档
pub mod config;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 事实构建与时间线合成
pub mod engine;

// 报告层 - 校验与分析
pub mod report;

// 导出层 - CSV 与清单
pub mod export;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EventType, ProductBand, Section};

// 领域实体
pub use domain::{
    CoilOperation, CrewAssignment, Equipment, EquipmentEvent, MaintenanceEvent, ProductionCoil,
};

// 配置
pub use config::{LineProfile, PipelineConfig};

// 导入
pub use importer::{ImportError, ImportResult, MesImporter};

// 引擎
pub use engine::{
    DurationModel, DurationSampler, EngineError, EngineResult, PipelineOutput, PipelineRunner,
};

// 报告与导出
pub use export::{CsvExporter, ExportManifest, RunReport};
pub use report::{AnalysisReport, ValidationReport};
