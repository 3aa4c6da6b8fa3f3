// ==========================================
// 精整线时序合成 - 流水线编排器
// ==========================================
// 用途: 协调导入、事实构建、时间线合成、事件日志与校验的执行顺序
// 流程:
//   1. 导入生产/检修表（日期窗口 + 清洗）
//   2. 检修事实 + 设备维度（拓扑）
//   3. 生产卷事实（排序 + 节奏间隔）+ 间隔清洗
//   4. 班组轮转
//   5. 工序时间线合成（锚定完工时间）
//   6. 设备事件日志
//   7. 校验 + 分析
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::crew::CrewAssignment;
use crate::domain::equipment::Equipment;
use crate::domain::event::EquipmentEvent;
use crate::domain::maintenance::MaintenanceEvent;
use crate::domain::operation::CoilOperation;
use crate::domain::production::ProductionCoil;
use crate::engine::coil_fact::CoilFactBuilder;
use crate::engine::crew_rotation::CrewSchedule;
use crate::engine::duration::{DurationSampler, RandomDurationSampler};
use crate::engine::error::EngineResult;
use crate::engine::event_log::EventLogBuilder;
use crate::engine::gap_cleaner::{GapCleaner, GapCleaningReport};
use crate::engine::maintenance_fact::MaintenanceFactBuilder;
use crate::engine::operation_synth::OperationSynthesizer;
use crate::engine::topology::LineTopology;
use crate::importer::{FilterSummary, MaintenanceImport, MesImporter, ProductionImport, RawTable};
use crate::report::{AnalysisReport, ValidationReport};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, instrument};

// ==========================================
// PipelineSummary - 各阶段计数
// ==========================================
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineSummary {
    pub seed: Option<u64>,
    pub production_filter: FilterSummary,
    pub maintenance_filter: FilterSummary,
    pub coils_total: usize,
    pub coils_missing_id: usize,
    pub coils_synthesized: usize,
    pub coils_skipped_missing_completion: usize,
    pub maintenance_events: usize,
    pub maintenance_dropped_missing_start: usize,
    pub maintenance_dropped_missing_duration: usize,
    pub equipment_total: usize,
    pub equipment_excluded: usize,
    pub line_equipment: usize,
    pub crew_days: usize,
    pub operations: usize,
    pub run_events: usize,
    pub idle_events: usize,
    pub fault_events: usize,
    pub faults_unmatched: usize,
    pub gap_cleaning: GapCleaningReport,
}

// ==========================================
// PipelineOutput - 全部产出表 + 报告
// ==========================================
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub raw_production: RawTable,
    pub raw_maintenance: RawTable,
    pub dim_equipment: Vec<Equipment>,
    pub crew_schedule: Vec<CrewAssignment>,
    pub coils: Vec<ProductionCoil>,
    pub maintenance: Vec<MaintenanceEvent>,
    pub operations: Vec<CoilOperation>,
    pub events: Vec<EquipmentEvent>,
    pub summary: PipelineSummary,
    pub validation: ValidationReport,
    pub analysis: AnalysisReport,
}

// ==========================================
// PipelineRunner - 流水线编排器
// ==========================================
pub struct PipelineRunner {
    config: PipelineConfig,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 执行完整流水线（读取配置中的输入文件）
    #[instrument(skip(self), fields(seed = ?self.config.seed))]
    pub fn run(&self) -> EngineResult<PipelineOutput> {
        let importer = MesImporter::from_config(&self.config);
        let production = importer.load_production(&self.config.production_file)?;
        let maintenance = importer.load_maintenance(&self.config.maintenance_file)?;

        let rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut sampler = RandomDurationSampler::new(&self.config.line, rng);
        self.run_with_imports(production, maintenance, &mut sampler)
    }

    /// 由已导入数据执行后续阶段, 时长来源由调用方注入
    pub fn run_with_imports<S: DurationSampler + ?Sized>(
        &self,
        production: ProductionImport,
        maintenance: MaintenanceImport,
        sampler: &mut S,
    ) -> EngineResult<PipelineOutput> {
        let config = &self.config;
        let mut summary = PipelineSummary {
            seed: config.seed,
            production_filter: production.filter,
            maintenance_filter: maintenance.filter,
            ..Default::default()
        };

        // ==========================================
        // 步骤2: 检修事实 + 设备维度
        // ==========================================
        // 设备维度取自全部过滤后检修行, 早于缺开始/缺时长的丢弃
        let topology = LineTopology::build(
            maintenance
                .records
                .iter()
                .filter_map(|r| r.equipment_name.as_deref()),
            &config.line,
        );

        let maintenance_build = MaintenanceFactBuilder.build(maintenance.records);
        summary.maintenance_events = maintenance_build.events.len();
        summary.maintenance_dropped_missing_start = maintenance_build.dropped_missing_start;
        summary.maintenance_dropped_missing_duration = maintenance_build.dropped_missing_duration;

        let line = topology.require_line()?;
        summary.equipment_total = topology.dimension().len();
        summary.equipment_excluded = topology.excluded_names().len();
        summary.line_equipment = line.len();

        // ==========================================
        // 步骤3: 生产卷事实 + 间隔清洗
        // ==========================================
        let coil_build = CoilFactBuilder::new(&config.product).build(production.records);
        let mut coils = coil_build.coils;
        summary.coils_total = coils.len();
        summary.coils_missing_id = coil_build.missing_id;
        summary.gap_cleaning = GapCleaner::new(config.policy).clean(&mut coils);

        // ==========================================
        // 步骤4: 班组轮转
        // ==========================================
        let crews = CrewSchedule::build(
            coils.iter().filter_map(|c| c.production_date),
            &config.crew_codes,
        );
        summary.crew_days = crews.len();

        // ==========================================
        // 步骤5: 工序时间线合成
        // ==========================================
        let synthesis =
            OperationSynthesizer::new(&line, &crews, config.shift).synthesize(&mut coils, sampler);
        summary.coils_synthesized = synthesis.processed;
        summary.coils_skipped_missing_completion = synthesis.skipped_coil_ids.len();
        summary.operations = synthesis.operations.len();

        // ==========================================
        // 步骤6: 设备事件日志
        // ==========================================
        let event_build = EventLogBuilder::new(config.policy.idle_gap_threshold_sec).build(
            &synthesis.operations,
            &maintenance_build.events,
            topology.dimension(),
        );
        summary.run_events = event_build.run_events;
        summary.idle_events = event_build.idle_events;
        summary.fault_events = event_build.fault_events;
        summary.faults_unmatched = event_build.faults_unmatched;

        // ==========================================
        // 步骤7: 校验 + 分析
        // ==========================================
        let validation =
            ValidationReport::evaluate(&synthesis, &coils, &event_build.events, &config.policy);
        let analysis = AnalysisReport::build(
            &coils,
            &synthesis.operations,
            &event_build.events,
            &config.line,
        );

        info!(
            coils = summary.coils_total,
            synthesized = summary.coils_synthesized,
            operations = summary.operations,
            events = event_build.events.len(),
            validation_passed = validation.passed,
            "流水线执行完成"
        );

        Ok(PipelineOutput {
            raw_production: production.raw_filtered,
            raw_maintenance: maintenance.raw_filtered,
            dim_equipment: topology.dimension().to_vec(),
            crew_schedule: crews.assignments(),
            coils,
            maintenance: maintenance_build.events,
            operations: synthesis.operations,
            events: event_build.events,
            summary,
            validation,
            analysis,
        })
    }
}
