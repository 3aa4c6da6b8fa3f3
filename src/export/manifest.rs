// ==========================================
// 精整线时序合成 - 导出清单与报告
// ==========================================
// 产出:
// - export_manifest.json: 批次号 / 生成时间 / 种子 / 各表文件与行数
// - validation_report.json: 阶段计数 + 校验结果 + 分析统计
// ==========================================

use crate::config::PipelineConfig;
use crate::engine::error::EngineResult;
use crate::engine::orchestrator::{PipelineOutput, PipelineSummary};
use crate::export::csv_exporter::ExportedTable;
use crate::report::{AnalysisReport, ValidationReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const MANIFEST_FILE: &str = "export_manifest.json";
pub const REPORT_FILE: &str = "validation_report.json";

#[derive(Debug, Clone, Serialize)]
pub struct ExportManifest {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub seed: Option<u64>,
    pub validation_passed: bool,
    pub tables: Vec<ExportedTable>,
    pub config: PipelineConfig,
}

impl ExportManifest {
    pub fn new(config: &PipelineConfig, validation_passed: bool, tables: Vec<ExportedTable>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            seed: config.seed,
            validation_passed,
            tables,
            config: config.clone(),
        }
    }

    pub fn write_to<P: AsRef<Path>>(&self, output_dir: P) -> EngineResult<PathBuf> {
        let path = output_dir.as_ref().join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!(run_id = %self.run_id, path = %path.display(), "导出清单写出完成");
        Ok(path)
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub summary: &'a PipelineSummary,
    pub validation: &'a ValidationReport,
    pub analysis: &'a AnalysisReport,
}

impl<'a> RunReport<'a> {
    pub fn from_output(output: &'a PipelineOutput) -> Self {
        Self {
            summary: &output.summary,
            validation: &output.validation,
            analysis: &output.analysis,
        }
    }

    pub fn write_to<P: AsRef<Path>>(&self, output_dir: P) -> EngineResult<PathBuf> {
        let path = output_dir.as_ref().join(REPORT_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_written_with_tables() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            seed: Some(42),
            ..PipelineConfig::default()
        };
        let tables = vec![ExportedTable {
            table: "dim_equipment".to_string(),
            file_name: "dim_equipment.csv".to_string(),
            rows: 3,
            bytes: 120,
        }];

        let manifest = ExportManifest::new(&config, true, tables);
        let path = manifest.write_to(dir.path()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["seed"], 42);
        assert_eq!(value["tables"][0]["rows"], 3);
        assert_eq!(value["run_id"].as_str().unwrap().len(), 36);
    }
}
