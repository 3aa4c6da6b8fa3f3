// ==========================================
// 精整线时序合成 - 导入层
// ==========================================
// 职责: 外部 MES 导出导入, 生成中间记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod date_filter;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod mes_importer;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use date_filter::{DateWindowFilter, FilterSummary};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, MaintenanceColumnPlan, ProductionColumnPlan};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawTable, UniversalFileParser};
pub use mes_importer::{MaintenanceImport, MesImporter, ProductionImport};
