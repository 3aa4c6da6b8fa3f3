// ==========================================
// 精整线时序合成 - CSV 表导出
// ==========================================
// 职责: 将维度/事实表与过滤后原始表写入输出目录
// 口径: 结构化表经 serde 序列化; 原始表按原表头顺序透传
// ==========================================

use crate::domain::crew::CrewAssignment;
use crate::domain::equipment::Equipment;
use crate::domain::event::EquipmentEvent;
use crate::domain::maintenance::MaintenanceEvent;
use crate::domain::operation::CoilOperation;
use crate::domain::production::ProductionCoil;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::orchestrator::PipelineOutput;
use crate::importer::file_parser::RawTable;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 导出表名（同时作为文件名主干）
pub mod table_names {
    pub const DIM_EQUIPMENT: &str = "dim_equipment";
    pub const DIM_DATE_CREW_SCHEDULE: &str = "dim_date_crew_schedule";
    pub const FACT_PRODUCTION_COIL: &str = "fact_production_coil";
    pub const FACT_MAINTENANCE_EVENT: &str = "fact_maintenance_event";
    pub const FACT_COIL_OPERATION_CYCLE: &str = "fact_coil_operation_cycle";
    pub const FACT_EQUIPMENT_EVENT_LOG: &str = "fact_equipment_event_log";
    pub const RAW_PRODUCTION_FILTERED: &str = "raw_production_filtered";
    pub const RAW_MAINTENANCE_FILTERED: &str = "raw_maintenance_filtered";
}

// ==========================================
// TableRow - 导出行表头
// ==========================================
// 列名与字段声明顺序一致; 空表仍写出表头
pub trait TableRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl TableRow for Equipment {
    const COLUMNS: &'static [&'static str] = &[
        "equipment_id",
        "equipment_name",
        "process_order",
        "section",
        "equipment_type",
        "is_bottleneck_candidate",
        "is_active",
    ];
}

impl TableRow for CrewAssignment {
    const COLUMNS: &'static [&'static str] = &["production_date", "day_crew", "night_crew"];
}

impl TableRow for ProductionCoil {
    const COLUMNS: &'static [&'static str] = &[
        "coil_id",
        "parent_coil_id",
        "production_date",
        "completion_ts",
        "shift_code",
        "thickness_mm",
        "width_mm",
        "mass_out_tons",
        "hours",
        "grade",
        "next_process",
        "type_code",
        "is_prime",
        "is_scrap",
        "gap_from_prev_completion_min",
        "gap_from_prev_parent_min",
        "cast",
        "slab",
        "start_datetime",
        "end_datetime",
        "total_cycle_time_min",
    ];
}

impl TableRow for MaintenanceEvent {
    const COLUMNS: &'static [&'static str] = &[
        "start_datetime",
        "duration_hours",
        "duration_min",
        "equipment_name",
        "crew",
        "shifts",
        "category",
        "delay_type",
        "area",
        "sub_area",
        "hierarchy",
        "description",
        "day",
        "reasponsible",
        "responsible",
    ];
}

impl TableRow for CoilOperation {
    const COLUMNS: &'static [&'static str] = &[
        "coil_id",
        "parent_coil_id",
        "equipment_id",
        "equipment_name",
        "production_date",
        "shift_code",
        "operation_start_ts",
        "operation_end_ts",
        "operation_duration_sec",
        "queue_time_sec",
        "is_bottleneck_step",
        "type_code",
        "is_prime",
        "is_scrap",
    ];
}

impl TableRow for EquipmentEvent {
    const COLUMNS: &'static [&'static str] = &[
        "equipment_id",
        "equipment_name",
        "event_type",
        "event_start_ts",
        "event_end_ts",
        "event_duration_sec",
        "coil_id",
        "parent_coil_id",
        "shift_code",
        "type_code",
        "is_prime",
        "is_scrap",
        "event_date",
    ];
}

/// 单表导出记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedTable {
    pub table: String,
    pub file_name: String,
    pub rows: usize,
    pub bytes: u64,
}

pub struct CsvExporter {
    output_dir: PathBuf,
}

impl CsvExporter {
    /// 创建导出器（输出目录不存在时创建）
    pub fn new<P: AsRef<Path>>(output_dir: P) -> EngineResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 导出全部八张表, 返回导出清单
    pub fn export_all(&self, output: &PipelineOutput) -> EngineResult<Vec<ExportedTable>> {
        use table_names::*;

        let tables = vec![
            self.write_table(DIM_EQUIPMENT, &output.dim_equipment)?,
            self.write_table(DIM_DATE_CREW_SCHEDULE, &output.crew_schedule)?,
            self.write_table(FACT_PRODUCTION_COIL, &output.coils)?,
            self.write_table(FACT_MAINTENANCE_EVENT, &output.maintenance)?,
            self.write_table(FACT_COIL_OPERATION_CYCLE, &output.operations)?,
            self.write_table(FACT_EQUIPMENT_EVENT_LOG, &output.events)?,
            self.write_raw_table(RAW_PRODUCTION_FILTERED, &output.raw_production)?,
            self.write_raw_table(RAW_MAINTENANCE_FILTERED, &output.raw_maintenance)?,
        ];

        info!(
            tables = tables.len(),
            dir = %self.output_dir.display(),
            total_rows = tables.iter().map(|t| t.rows).sum::<usize>(),
            "CSV 导出完成"
        );
        Ok(tables)
    }

    /// 序列化写出一张表（表头取自字段名, 空表显式写表头）
    pub fn write_table<T: TableRow>(&self, table: &str, rows: &[T]) -> EngineResult<ExportedTable> {
        let path = self.table_path(table);
        let mut writer = csv::Writer::from_path(&path)?;
        if rows.is_empty() {
            writer.write_record(T::COLUMNS)?;
        }
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        self.finish(table, path, rows.len())
    }

    /// 原始表透传写出（保留原表头顺序）
    pub fn write_raw_table(&self, table: &str, raw: &RawTable) -> EngineResult<ExportedTable> {
        let path = self.table_path(table);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&raw.headers)?;
        for row in &raw.rows {
            writer.write_record(raw.ordered_values(row))?;
        }
        writer.flush()?;
        self.finish(table, path, raw.len())
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.output_dir.join(format!("{table}.csv"))
    }

    fn finish(&self, table: &str, path: PathBuf, rows: usize) -> EngineResult<ExportedTable> {
        let bytes = fs::metadata(&path)?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| EngineError::Export {
                table: table.to_string(),
                message: format!("无效输出路径: {}", path.display()),
            })?;
        debug!(table, rows, bytes, "表写出完成");
        Ok(ExportedTable {
            table: table.to_string(),
            file_name,
            rows,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::EventType;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_write_table_creates_dir_and_header() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path().join("nested/out")).unwrap();

        let rows = vec![CrewAssignment {
            production_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            day_crew: "A".to_string(),
            night_crew: "B".to_string(),
        }];
        let exported = exporter
            .write_table(table_names::DIM_DATE_CREW_SCHEDULE, &rows)
            .unwrap();

        assert_eq!(exported.file_name, "dim_date_crew_schedule.csv");
        assert_eq!(exported.rows, 1);
        let content = fs::read_to_string(exporter.output_dir().join(&exported.file_name)).unwrap();
        assert_eq!(content, "production_date,day_crew,night_crew\n2024-06-01,A,B\n");
        assert_eq!(exported.bytes, content.len() as u64);
    }

    #[test]
    fn test_raw_table_keeps_header_order() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path()).unwrap();

        let mut row = HashMap::new();
        row.insert("Width".to_string(), "1250".to_string());
        row.insert("UID".to_string(), "U1".to_string());
        let raw = RawTable {
            headers: vec!["UID".to_string(), "CID".to_string(), "Width".to_string()],
            rows: vec![row],
        };

        exporter
            .write_raw_table(table_names::RAW_PRODUCTION_FILTERED, &raw)
            .unwrap();
        let content =
            fs::read_to_string(dir.path().join("raw_production_filtered.csv")).unwrap();
        assert_eq!(content, "UID,CID,Width\nU1,,1250\n");
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path()).unwrap();

        let events: Vec<EquipmentEvent> = Vec::new();
        let exported = exporter
            .write_table(table_names::FACT_EQUIPMENT_EVENT_LOG, &events)
            .unwrap();
        assert_eq!(exported.rows, 0);

        let content =
            fs::read_to_string(dir.path().join("fact_equipment_event_log.csv")).unwrap();
        assert_eq!(content, format!("{}\n", EquipmentEvent::COLUMNS.join(",")));

        let crews: Vec<CrewAssignment> = Vec::new();
        exporter
            .write_table(table_names::DIM_DATE_CREW_SCHEDULE, &crews)
            .unwrap();
        let content =
            fs::read_to_string(dir.path().join("dim_date_crew_schedule.csv")).unwrap();
        assert_eq!(content, "production_date,day_crew,night_crew\n");
    }

    #[test]
    fn test_columns_match_serialized_header() {
        let dir = TempDir::new().unwrap();
        let exporter = CsvExporter::new(dir.path()).unwrap();
        let ts = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let events = vec![EquipmentEvent {
            equipment_id: 1,
            equipment_name: "Decoiler".to_string(),
            event_type: EventType::Idle,
            event_start_ts: ts,
            event_end_ts: ts,
            event_duration_sec: 0.0,
            coil_id: None,
            parent_coil_id: None,
            shift_code: None,
            type_code: None,
            is_prime: false,
            is_scrap: false,
            event_date: ts.date(),
        }];
        exporter
            .write_table(table_names::FACT_EQUIPMENT_EVENT_LOG, &events)
            .unwrap();
        let content =
            fs::read_to_string(dir.path().join("fact_equipment_event_log.csv")).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, EquipmentEvent::COLUMNS.join(","));
    }
}
