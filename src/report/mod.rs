// ==========================================
// 精整线时序合成 - 报告层
// ==========================================
// 职责: 合成结果校验 + 产线分析统计
// ==========================================

pub mod analysis;
pub mod stats;
pub mod validation;

pub use analysis::AnalysisReport;
pub use stats::SummaryStats;
pub use validation::ValidationReport;
