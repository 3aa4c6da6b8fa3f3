// ==========================================
// 精整线时序合成 - MES 导出导入器
// ==========================================
// 职责: 整合导入流程, 从文件到中间记录
// 流程: 解析 → 日期窗口过滤 → 列布局解析 → 字段映射/清洗
// ==========================================

use crate::config::{DateWindow, PipelineConfig};
use crate::domain::maintenance::RawMaintenanceRecord;
use crate::domain::production::RawProductionRecord;
use crate::importer::date_filter::{DateWindowFilter, FilterSummary};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{maintenance_columns, production_columns, FieldMapper};
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use std::path::Path;
use tracing::{debug, info, instrument};

/// 生产表导入结果
#[derive(Debug, Clone)]
pub struct ProductionImport {
    /// 过滤后原始行（透传导出）
    pub raw_filtered: RawTable,
    pub records: Vec<RawProductionRecord>,
    pub filter: FilterSummary,
}

/// 检修表导入结果
#[derive(Debug, Clone)]
pub struct MaintenanceImport {
    pub raw_filtered: RawTable,
    pub records: Vec<RawMaintenanceRecord>,
    pub filter: FilterSummary,
}

// ==========================================
// MesImporter - MES 导出导入器
// ==========================================
pub struct MesImporter {
    parser: UniversalFileParser,
    mapper: FieldMapper,
    window: Option<DateWindow>,
}

impl MesImporter {
    pub fn new(timestamp_format: &str, window: Option<DateWindow>) -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper::new(timestamp_format),
            window,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.timestamp_format, config.date_window)
    }

    fn window_filter(&self) -> DateWindowFilter<'_> {
        DateWindowFilter::new(self.mapper.cleaner(), self.mapper.timestamp_format(), self.window)
    }

    #[instrument(skip(self, path), fields(file = %path.as_ref().display()))]
    pub fn load_production<P: AsRef<Path>>(&self, path: P) -> ImportResult<ProductionImport> {
        let table = self.parser.parse(path.as_ref())?;
        info!(rows = table.len(), columns = table.headers.len(), "生产表解析完成");
        self.import_production_table(table)
    }

    /// 从已解析的原始表导入生产记录
    pub fn import_production_table(&self, table: RawTable) -> ImportResult<ProductionImport> {
        // === 步骤 1: 日期窗口 ===
        let (raw_filtered, filter) = self
            .window_filter()
            .apply(table, production_columns::PRODUCTION_DATE);
        info!(
            total = filter.total_rows,
            kept = filter.kept_rows,
            out_of_window = filter.out_of_window_rows,
            unparseable = filter.unparseable_rows,
            "生产表日期过滤完成"
        );

        // === 步骤 2: 列布局（必需列缺失立即失败; 厚度列按过滤后数据判定）===
        let plan = self.mapper.plan_production(&raw_filtered)?;
        debug!(thickness_column = plan.thickness_column, "生产表列布局确定");

        // === 步骤 3: 字段映射 ===
        let records: Vec<RawProductionRecord> = raw_filtered
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.mapper.map_production(row, &plan, idx + 1))
            .collect();

        Ok(ProductionImport {
            raw_filtered,
            records,
            filter,
        })
    }

    #[instrument(skip(self, path), fields(file = %path.as_ref().display()))]
    pub fn load_maintenance<P: AsRef<Path>>(&self, path: P) -> ImportResult<MaintenanceImport> {
        let table = self.parser.parse(path.as_ref())?;
        info!(rows = table.len(), columns = table.headers.len(), "检修表解析完成");
        self.import_maintenance_table(table)
    }

    pub fn import_maintenance_table(&self, table: RawTable) -> ImportResult<MaintenanceImport> {
        let plan = self.mapper.plan_maintenance(&table)?;
        debug!(
            hours_column = plan.has_hours_column,
            span_column = plan.has_span_column,
            "检修表列布局确定"
        );

        let (raw_filtered, filter) = self
            .window_filter()
            .apply(table, maintenance_columns::START);
        info!(
            total = filter.total_rows,
            kept = filter.kept_rows,
            out_of_window = filter.out_of_window_rows,
            unparseable = filter.unparseable_rows,
            "检修表日期过滤完成"
        );

        let records: Vec<RawMaintenanceRecord> = raw_filtered
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.mapper.map_maintenance(row, &plan, idx + 1))
            .collect();

        Ok(MaintenanceImport {
            raw_filtered,
            records,
            filter,
        })
    }
}
