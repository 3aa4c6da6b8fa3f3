// ==========================================
// 精整线时序合成 - 命令行入口
// ==========================================
// 子命令:
// - run: 执行完整流水线并导出
// - print-config: 输出生效配置（JSON）
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coil_line_etl::export::{CsvExporter, ExportManifest, RunReport};
use coil_line_etl::logging::{self, LogFormat};
use coil_line_etl::{PipelineConfig, PipelineRunner};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "coil-line-etl")]
#[command(about = "精整线 MES 数据清洗与设备运行时序合成", long_about = None)]
struct Cli {
    /// 以 JSON 行格式输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

/// 输入与配置参数（两个子命令共用）
#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// 配置文件（JSON, 缺省字段取默认值）
    #[arg(short, long, env = "COIL_LINE_ETL_CONFIG")]
    config: Option<PathBuf>,

    /// 生产完工导出文件（.csv/.xlsx）
    #[arg(long)]
    production: Option<PathBuf>,

    /// 检修停机导出文件（.csv/.xlsx）
    #[arg(long)]
    maintenance: Option<PathBuf>,

    /// 输出目录
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// 随机种子（相同种子相同输出）
    #[arg(long, env = "COIL_LINE_ETL_SEED")]
    seed: Option<u64>,

    /// 关闭日期窗口过滤
    #[arg(long)]
    no_date_window: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 执行完整流水线并导出全部表
    Run(ConfigArgs),
    /// 打印生效配置
    PrintConfig(ConfigArgs),
}

impl ConfigArgs {
    /// 配置文件 → 命令行覆盖 → 校验
    fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load_from_file(path)
                .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(path) = &self.production {
            config.production_file = path.clone();
        }
        if let Some(path) = &self.maintenance {
            config.maintenance_file = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_date_window {
            config.date_window = None;
        }

        config.validate().context("配置校验失败")?;
        Ok(config)
    }
}

fn run(config: PipelineConfig) -> Result<()> {
    let runner = PipelineRunner::new(config);
    let output = runner.run().context("流水线执行失败")?;

    let config = runner.config();
    let exporter = CsvExporter::new(&config.output_dir)
        .with_context(|| format!("创建输出目录失败: {}", config.output_dir.display()))?;
    let tables = exporter.export_all(&output).context("CSV 导出失败")?;

    RunReport::from_output(&output)
        .write_to(exporter.output_dir())
        .context("写出运行报告失败")?;
    let manifest = ExportManifest::new(config, output.validation.passed, tables);
    manifest
        .write_to(exporter.output_dir())
        .context("写出导出清单失败")?;

    if !output.validation.passed {
        warn!(
            violations = output.validation.violation_count(),
            "校验存在违规项, 详见 validation_report.json"
        );
    }
    info!(
        run_id = %manifest.run_id,
        dir = %exporter.output_dir().display(),
        coils = output.summary.coils_synthesized,
        operations = output.summary.operations,
        "导出完成"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_with_format(if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    match cli.command {
        Command::Run(args) => run(args.resolve()?),
        Command::PrintConfig(args) => {
            let config = args.resolve()?;
            println!("{}", config.snapshot_json()?);
            Ok(())
        }
    }
}
