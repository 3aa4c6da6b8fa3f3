// ==========================================
// 流水线端到端测试
// ==========================================
// 场景: 临时 CSV → PipelineRunner → CSV 导出 + 清单
// 覆盖: 零漂移 / 连续性 / 间隔清洗 / FAULT 关联计数 / 种子复现 / 致命错误
// ==========================================


use coil_line_etl::engine::{EngineError, PipelineOutput, PipelineRunner};
use coil_line_etl::export::{CsvExporter, ExportManifest, RunReport, MANIFEST_FILE, REPORT_FILE};
use coil_line_etl::importer::ImportError;
use coil_line_etl::{EventType, PipelineConfig};
use std::fs;
use tempfile::TempDir;
use test_helpers::*;

const COILS: &[ProductionRow] = &[
    ("U1", "P1", "06/01/24 10:00", "1.8", "1250", "HL"),
    ("U2", "P1", "06/01/24 10:05", "1.8", "1250", "HL"),
    ("U3", "P2", "06/01/24 10:20", "3.5", "1500", "HX"),
    ("U4", "P2", "06/01/24 10:26", "3.5", "1500", "HM"),
    ("U5", "P3", "06/01/24 19:00", "2.5", "1350", "98"),
    ("U6", "P3", "06/02/24 05:30", "2.5", "1350", "HL"),
    ("U7", "P4", "06/02/24 07:00", "2.2", "1320", "HL"),
    ("U8", "P4", "06/02/24 07:04", "2.2", "1320", "HZ"),
];

fn maintenance_fixture() -> Vec<Vec<String>> {
    let mut rows = full_line_maintenance();
    rows.extend(maintenance_rows(&[
        ("06/01/24 10:02", "1.5", "Decoiler(2)", "B"),
        ("06/01/24 11:00", "2", "Cranes", "C"),
        ("06/01/24 12:00", "0.5", "Lube System", "C"),
        ("06/01/24 13:00", "1", "", "A"),
        ("09/15/24 08:00", "1", "Decoiler", "A"),
        ("bad date", "1", "Decoiler", "A"),
    ]));
    rows
}

fn run_fixture(dir: &TempDir, seed: u64) -> PipelineOutput {
    let production = write_production(dir.path(), COILS);
    let maintenance = write_maintenance(dir.path(), maintenance_fixture());
    let config = config_for(production, maintenance, dir.path().join("out"), seed);
    PipelineRunner::new(config).run().unwrap()
}

#[test]
fn test_pipeline_counts_and_invariants() {
    coil_line_etl::logging::init_test();
    let dir = TempDir::new().unwrap();
    let output = run_fixture(&dir, 42);
    let summary = &output.summary;

    // 导入与过滤
    assert_eq!(summary.production_filter.kept_rows, 8);
    assert_eq!(summary.maintenance_filter.total_rows, 23);
    assert_eq!(summary.maintenance_filter.kept_rows, 21);
    assert_eq!(summary.maintenance_filter.out_of_window_rows, 1);
    assert_eq!(summary.maintenance_filter.unparseable_rows, 1);

    // 拓扑: 17 道产线 + Lube System（Cranes 被排除）
    assert_eq!(summary.equipment_total, 18);
    assert_eq!(summary.equipment_excluded, 1);
    assert_eq!(summary.line_equipment, 17);

    // 合成
    assert_eq!(summary.coils_synthesized, 8);
    assert_eq!(summary.coils_skipped_missing_completion, 0);
    assert_eq!(output.operations.len(), 8 * 17);
    assert_eq!(summary.run_events, 8 * 17);

    // FAULT: Cranes 与空子区域未关联
    assert_eq!(summary.fault_events, 19);
    assert_eq!(summary.faults_unmatched, 2);
    let lube_faults = output
        .events
        .iter()
        .filter(|e| e.event_type == EventType::Fault && e.equipment_name == "Lube System")
        .count();
    assert_eq!(lube_faults, 1);

    // 校验
    assert!(output.validation.passed, "{:?}", output.validation.samples);
    assert_eq!(output.validation.max_drift_us, 0);
    assert_eq!(output.validation.coils_checked, 8);

    for coil in &output.coils {
        assert_eq!(coil.end_datetime, coil.completion_ts);
        assert!(coil.start_datetime < coil.end_datetime);
        assert!(coil.total_cycle_time_min.unwrap() > 0.0);
    }
}

#[test]
fn test_gap_cleaning_and_crew_codes() {
    let dir = TempDir::new().unwrap();
    let output = run_fixture(&dir, 7);

    let gaps = &output.summary.gap_cleaning;
    assert_eq!(gaps.completion_gaps_over_cap, 2);
    assert_eq!(gaps.parent_gaps_over_cap, 4);
    assert_eq!(gaps.negative_completion_gaps, 0);

    let coil = |id: &str| output.coils.iter().find(|c| c.coil_id == id).unwrap();
    assert_eq!(coil("U2").gap_from_prev_completion_min, Some(5.0));
    assert_eq!(coil("U5").gap_from_prev_completion_min, None);
    assert_eq!(coil("U3").gap_from_prev_parent_min, Some(15.0));
    assert_eq!(coil("U4").gap_from_prev_parent_min, Some(15.0));
    assert_eq!(coil("U7").gap_from_prev_parent_min, None);

    // 6/1 → 白 A 夜 B; 6/2 → 白 B 夜 C
    assert_eq!(coil("U1").shift_code.as_deref(), Some("A"));
    assert_eq!(coil("U5").shift_code.as_deref(), Some("B"));
    assert_eq!(coil("U6").shift_code.as_deref(), Some("C"));
    assert_eq!(coil("U7").shift_code.as_deref(), Some("B"));
    assert_eq!(output.crew_schedule.len(), 2);
}

#[test]
fn test_same_seed_reproduces_operations() {
    let a = run_fixture(&TempDir::new().unwrap(), 2024);
    let b = run_fixture(&TempDir::new().unwrap(), 2024);
    let c = run_fixture(&TempDir::new().unwrap(), 2025);

    assert_eq!(a.operations, b.operations);
    assert_eq!(a.coils, b.coils);
    assert_ne!(a.operations, c.operations);
}

#[test]
fn test_export_writes_tables_and_manifest() {
    let dir = TempDir::new().unwrap();
    let output = run_fixture(&dir, 42);
    let out_dir = dir.path().join("out");

    let exporter = CsvExporter::new(&out_dir).unwrap();
    let tables = exporter.export_all(&output).unwrap();
    RunReport::from_output(&output).write_to(&out_dir).unwrap();
    let config = PipelineConfig {
        seed: Some(42),
        ..PipelineConfig::default()
    };
    ExportManifest::new(&config, output.validation.passed, tables.clone())
        .write_to(&out_dir)
        .unwrap();

    assert_eq!(tables.len(), 8);
    for table in &tables {
        let path = out_dir.join(&table.file_name);
        assert!(path.exists(), "{} missing", table.file_name);
        assert_eq!(fs::metadata(&path).unwrap().len(), table.bytes);
    }

    let ops = tables
        .iter()
        .find(|t| t.table == "fact_coil_operation_cycle")
        .unwrap();
    assert_eq!(ops.rows, 8 * 17);

    let coil_csv = fs::read_to_string(out_dir.join("fact_production_coil.csv")).unwrap();
    let header = coil_csv.lines().next().unwrap();
    assert!(header.starts_with("coil_id,parent_coil_id,production_date,completion_ts,shift_code"));

    let raw = fs::read_to_string(out_dir.join("raw_production_filtered.csv")).unwrap();
    assert!(raw.starts_with("UID,CID,Production Date,Thickess,Width,Mass out tons,Type\n"));
    assert_eq!(raw.lines().count(), 9);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join(REPORT_FILE)).unwrap()).unwrap();
    assert_eq!(report["validation"]["passed"], true);
    assert_eq!(report["analysis"]["total_coils"], 8);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest["tables"].as_array().unwrap().len(), 8);
}

#[test]
fn test_missing_completion_is_skipped_without_window() {
    let dir = TempDir::new().unwrap();
    let production = write_production(
        dir.path(),
        &[
            ("U1", "P1", "06/01/24 10:00", "2.5", "1350", "HL"),
            ("U2", "P1", "not a date", "2.5", "1350", "HL"),
        ],
    );
    let maintenance = write_maintenance(dir.path(), full_line_maintenance());
    let mut config = config_for(production, maintenance, dir.path().join("out"), 1);
    config.date_window = None;

    let output = PipelineRunner::new(config).run().unwrap();

    assert_eq!(output.summary.coils_total, 2);
    assert_eq!(output.summary.coils_synthesized, 1);
    assert_eq!(output.summary.coils_skipped_missing_completion, 1);
    let skipped = &output.coils[1];
    assert_eq!(skipped.coil_id, "U2");
    assert_eq!(skipped.shift_code, None);
    assert_eq!(skipped.start_datetime, None);
    assert_eq!(skipped.total_cycle_time_min, None);
    assert!(output.validation.passed);
}

#[test]
fn test_missing_thickness_column_is_fatal() {
    let dir = TempDir::new().unwrap();
    let production = write_csv(
        dir.path(),
        "production.csv",
        &["UID", "CID", "Production Date", "Width", "Mass out tons"],
        &[vec![
            "U1".to_string(),
            "P1".to_string(),
            "06/01/24 10:00".to_string(),
            "1250".to_string(),
            "10".to_string(),
        ]],
    );
    let maintenance = write_maintenance(dir.path(), full_line_maintenance());
    let config = config_for(production, maintenance, dir.path().join("out"), 1);

    let result = PipelineRunner::new(config).run();
    assert!(matches!(
        result,
        Err(EngineError::Import(ImportError::MissingColumn { .. }))
    ));
}

#[test]
fn test_empty_line_is_fatal() {
    let dir = TempDir::new().unwrap();
    let production = write_production(dir.path(), COILS);
    let maintenance = write_maintenance(
        dir.path(),
        maintenance_rows(&[
            ("06/01/24 10:00", "1", "Cranes", "A"),
            ("06/01/24 11:00", "1", "Lube System", "A"),
        ]),
    );
    let config = config_for(production, maintenance, dir.path().join("out"), 1);

    let result = PipelineRunner::new(config).run();
    assert!(matches!(result, Err(EngineError::EmptyLine)));
}
