// ==========================================
// 精整线时序合成 - 导出层
// ==========================================
// 职责: 星型模型 CSV 表 + 导出清单 + 运行报告
// ==========================================

pub mod csv_exporter;
pub mod manifest;

pub use csv_exporter::{table_names, CsvExporter, ExportedTable, TableRow};
pub use manifest::{ExportManifest, RunReport, MANIFEST_FILE, REPORT_FILE};
