// ==========================================
// 精整线时序合成 - 产线分析报告
// ==========================================
// 内容:
// - 周期时间: 总体 / 规格带 / 品种代码 / 班组 / 品质分类
// - 母卷成材: 每母卷分卷数、正品率、母卷周期
// - 节奏: 完工间隔 / 母卷间隔分布
// - 设备: 工序时长占比、RUN/IDLE/FAULT 时间占比、FAULT 与 RUN 重叠数
// ==========================================

use crate::config::LineProfile;
use crate::domain::event::EquipmentEvent;
use crate::domain::operation::CoilOperation;
use crate::domain::production::ProductionCoil;
use crate::domain::types::EventType;
use crate::engine::duration::DurationModel;
use crate::report::stats::SummaryStats;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

const UNKNOWN_KEY: &str = "UNKNOWN";

#[derive(Debug, Clone, Serialize)]
pub struct BandSummary {
    pub cycle_time_min: SummaryStats,
    /// 60 / 平均周期
    pub pieces_per_hour: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualitySplit {
    pub prime: Option<SummaryStats>,
    pub scrap: Option<SummaryStats>,
    pub other: Option<SummaryStats>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParentYieldSummary {
    pub parent_count: usize,
    pub avg_pieces_per_parent: f64,
    pub avg_prime_per_parent: f64,
    pub avg_scrap_per_parent: f64,
    pub avg_prime_rate_pct: f64,
    pub parent_cycle_time_min: Option<SummaryStats>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TempoSummary {
    pub completion_gap_min: Option<SummaryStats>,
    pub parent_gap_min: Option<SummaryStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentOperationSummary {
    pub equipment_id: u32,
    pub equipment_name: String,
    pub is_bottleneck_step: bool,
    pub operations: usize,
    pub mean_duration_sec: f64,
    pub min_duration_sec: f64,
    pub max_duration_sec: f64,
    pub total_duration_sec: f64,
    pub share_of_line_pct: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EquipmentStateSummary {
    pub equipment_id: u32,
    pub equipment_name: String,
    pub run_min: f64,
    pub idle_min: f64,
    pub fault_min: f64,
    pub run_pct: f64,
    pub idle_pct: f64,
    pub fault_pct: f64,
    pub faults_overlapping_run: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub total_coils: usize,
    pub synthesized_coils: usize,
    pub parent_coils: usize,
    pub prime_coils: usize,
    pub scrap_coils: usize,
    pub cycle_time_min: Option<SummaryStats>,
    pub cycle_by_band: BTreeMap<String, BandSummary>,
    pub cycle_by_type: BTreeMap<String, SummaryStats>,
    pub cycle_by_shift: BTreeMap<String, SummaryStats>,
    pub cycle_by_quality: QualitySplit,
    pub parent_yield: ParentYieldSummary,
    pub tempo: TempoSummary,
    pub equipment_operations: Vec<EquipmentOperationSummary>,
    pub equipment_states: Vec<EquipmentStateSummary>,
    pub total_faults_overlapping_run: usize,
}

impl AnalysisReport {
    pub fn build(
        coils: &[ProductionCoil],
        operations: &[CoilOperation],
        events: &[EquipmentEvent],
        profile: &LineProfile,
    ) -> Self {
        let model = DurationModel::new(profile);
        let cycles = || {
            coils
                .iter()
                .filter_map(|c| c.total_cycle_time_min.map(|t| (c, t)))
        };

        let mut report = AnalysisReport {
            total_coils: coils.len(),
            synthesized_coils: cycles().count(),
            prime_coils: coils.iter().filter(|c| c.is_prime).count(),
            scrap_coils: coils.iter().filter(|c| c.is_scrap).count(),
            cycle_time_min: SummaryStats::from_values(cycles().map(|(_, t)| t)),
            ..Default::default()
        };

        // === 分组周期 ===
        let mut by_band: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut by_type: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut by_shift: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let (mut prime, mut scrap, mut other) = (Vec::new(), Vec::new(), Vec::new());
        for (coil, t) in cycles() {
            let band = model.classify_band(coil.thickness_mm, coil.width_mm);
            by_band.entry(band.to_string()).or_default().push(t);
            by_type
                .entry(coil.type_code.clone().unwrap_or_else(|| UNKNOWN_KEY.to_string()))
                .or_default()
                .push(t);
            by_shift
                .entry(coil.shift_code.clone().unwrap_or_else(|| UNKNOWN_KEY.to_string()))
                .or_default()
                .push(t);
            match (coil.is_prime, coil.is_scrap) {
                (true, _) => prime.push(t),
                (_, true) => scrap.push(t),
                _ => other.push(t),
            }
        }

        report.cycle_by_band = by_band
            .into_iter()
            .filter_map(|(band, values)| {
                let stats = SummaryStats::from_values(values)?;
                let pieces_per_hour = if stats.mean > 0.0 { 60.0 / stats.mean } else { 0.0 };
                Some((
                    band,
                    BandSummary {
                        cycle_time_min: stats,
                        pieces_per_hour,
                    },
                ))
            })
            .collect();
        report.cycle_by_type = collect_stats(by_type);
        report.cycle_by_shift = collect_stats(by_shift);
        report.cycle_by_quality = QualitySplit {
            prime: SummaryStats::from_values(prime),
            scrap: SummaryStats::from_values(scrap),
            other: SummaryStats::from_values(other),
        };

        report.parent_yield = parent_yield(coils);
        report.parent_coils = report.parent_yield.parent_count;
        report.tempo = TempoSummary {
            completion_gap_min: SummaryStats::from_values(
                coils.iter().filter_map(|c| c.gap_from_prev_completion_min),
            ),
            parent_gap_min: SummaryStats::from_values(
                coils.iter().filter_map(|c| c.gap_from_prev_parent_min),
            ),
        };

        report.equipment_operations = equipment_operations(operations);
        report.equipment_states = equipment_states(events);
        report.total_faults_overlapping_run = report
            .equipment_states
            .iter()
            .map(|s| s.faults_overlapping_run)
            .sum();

        report
    }
}

fn collect_stats(groups: BTreeMap<String, Vec<f64>>) -> BTreeMap<String, SummaryStats> {
    groups
        .into_iter()
        .filter_map(|(key, values)| SummaryStats::from_values(values).map(|s| (key, s)))
        .collect()
}

fn percent(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

#[derive(Default)]
struct ParentAccumulator {
    pieces: usize,
    prime: usize,
    scrap: usize,
    first_start: Option<NaiveDateTime>,
    last_end: Option<NaiveDateTime>,
}

fn parent_yield(coils: &[ProductionCoil]) -> ParentYieldSummary {
    let mut parents: HashMap<&str, ParentAccumulator> = HashMap::new();
    for coil in coils {
        let acc = parents.entry(coil.parent_coil_id.as_str()).or_default();
        acc.pieces += 1;
        acc.prime += usize::from(coil.is_prime);
        acc.scrap += usize::from(coil.is_scrap);
        if let (Some(start), Some(end)) = (coil.start_datetime, coil.end_datetime) {
            acc.first_start = Some(acc.first_start.map_or(start, |s| s.min(start)));
            acc.last_end = Some(acc.last_end.map_or(end, |e| e.max(end)));
        }
    }

    let n = parents.len();
    if n == 0 {
        return ParentYieldSummary::default();
    }
    let avg = |f: fn(&ParentAccumulator) -> f64| parents.values().map(f).sum::<f64>() / n as f64;

    ParentYieldSummary {
        parent_count: n,
        avg_pieces_per_parent: avg(|a| a.pieces as f64),
        avg_prime_per_parent: avg(|a| a.prime as f64),
        avg_scrap_per_parent: avg(|a| a.scrap as f64),
        avg_prime_rate_pct: avg(|a| percent(a.prime as f64, a.pieces as f64)),
        parent_cycle_time_min: SummaryStats::from_values(parents.values().filter_map(|a| {
            let (start, end) = (a.first_start?, a.last_end?);
            Some((end - start).num_milliseconds() as f64 / 60_000.0)
        })),
    }
}

fn equipment_operations(operations: &[CoilOperation]) -> Vec<EquipmentOperationSummary> {
    let mut groups: BTreeMap<u32, EquipmentOperationSummary> = BTreeMap::new();
    for op in operations {
        let entry = groups
            .entry(op.equipment_id)
            .or_insert_with(|| EquipmentOperationSummary {
                equipment_id: op.equipment_id,
                equipment_name: op.equipment_name.clone(),
                is_bottleneck_step: op.is_bottleneck_step,
                operations: 0,
                mean_duration_sec: 0.0,
                min_duration_sec: f64::INFINITY,
                max_duration_sec: f64::NEG_INFINITY,
                total_duration_sec: 0.0,
                share_of_line_pct: 0.0,
            });
        entry.operations += 1;
        entry.total_duration_sec += op.operation_duration_sec;
        entry.min_duration_sec = entry.min_duration_sec.min(op.operation_duration_sec);
        entry.max_duration_sec = entry.max_duration_sec.max(op.operation_duration_sec);
    }

    let line_total: f64 = groups.values().map(|g| g.total_duration_sec).sum();
    let mut summaries: Vec<EquipmentOperationSummary> = groups
        .into_values()
        .map(|mut g| {
            g.mean_duration_sec = g.total_duration_sec / g.operations as f64;
            g.share_of_line_pct = percent(g.total_duration_sec, line_total);
            g
        })
        .collect();
    summaries.sort_by(|a, b| b.total_duration_sec.total_cmp(&a.total_duration_sec));
    summaries
}

fn equipment_states(events: &[EquipmentEvent]) -> Vec<EquipmentStateSummary> {
    let mut groups: BTreeMap<u32, (EquipmentStateSummary, Vec<&EquipmentEvent>, Vec<&EquipmentEvent>)> =
        BTreeMap::new();

    for event in events {
        let (summary, runs, faults) = groups.entry(event.equipment_id).or_insert_with(|| {
            (
                EquipmentStateSummary {
                    equipment_id: event.equipment_id,
                    equipment_name: event.equipment_name.clone(),
                    ..Default::default()
                },
                Vec::new(),
                Vec::new(),
            )
        });
        let minutes = event.event_duration_sec / 60.0;
        match event.event_type {
            EventType::Run => {
                summary.run_min += minutes;
                runs.push(event);
            }
            EventType::Idle => summary.idle_min += minutes,
            EventType::Fault => {
                summary.fault_min += minutes;
                faults.push(event);
            }
        }
    }

    groups
        .into_values()
        .map(|(mut summary, runs, faults)| {
            let total = summary.run_min + summary.idle_min + summary.fault_min;
            summary.run_pct = percent(summary.run_min, total);
            summary.idle_pct = percent(summary.idle_min, total);
            summary.fault_pct = percent(summary.fault_min, total);
            summary.faults_overlapping_run = count_overlaps(runs, &faults);
            summary
        })
        .collect()
}

/// FAULT 与任一 RUN 存在时间交集的条数
///
/// RUN 按开始排序后维护前缀最大结束时刻, 每条 FAULT 二分定位
pub fn count_overlaps(mut runs: Vec<&EquipmentEvent>, faults: &[&EquipmentEvent]) -> usize {
    if runs.is_empty() || faults.is_empty() {
        return 0;
    }
    runs.sort_by_key(|e| e.event_start_ts);

    let mut prefix_max_end = Vec::with_capacity(runs.len());
    let mut running = runs[0].event_end_ts;
    for run in &runs {
        running = running.max(run.event_end_ts);
        prefix_max_end.push(running);
    }

    faults
        .iter()
        .filter(|fault| {
            let idx = runs.partition_point(|r| r.event_start_ts < fault.event_end_ts);
            idx > 0 && prefix_max_end[idx - 1] > fault.event_start_ts
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn event(kind: EventType, start: NaiveDateTime, end: NaiveDateTime) -> EquipmentEvent {
        EquipmentEvent {
            equipment_id: 1,
            equipment_name: "Decoiler".to_string(),
            event_type: kind,
            event_start_ts: start,
            event_end_ts: end,
            event_duration_sec: (end - start).num_seconds() as f64,
            coil_id: None,
            parent_coil_id: None,
            shift_code: None,
            type_code: None,
            is_prime: false,
            is_scrap: false,
            event_date: start.date(),
        }
    }

    #[test]
    fn test_overlap_count() {
        let r1 = event(EventType::Run, ts(10, 0), ts(10, 30));
        let r2 = event(EventType::Run, ts(11, 0), ts(11, 10));
        let inside = event(EventType::Fault, ts(10, 10), ts(10, 20));
        let between = event(EventType::Fault, ts(10, 30), ts(11, 0));
        let straddle = event(EventType::Fault, ts(10, 50), ts(11, 5));

        let n = count_overlaps(vec![&r2, &r1], &[&inside, &between, &straddle]);
        assert_eq!(n, 2);
    }

    #[test]
    fn test_state_shares() {
        let events = vec![
            event(EventType::Run, ts(10, 0), ts(10, 30)),
            event(EventType::Idle, ts(10, 30), ts(10, 45)),
            event(EventType::Fault, ts(10, 45), ts(11, 0)),
        ];
        let states = equipment_states(&events);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].run_min, 30.0);
        assert_eq!(states[0].run_pct, 50.0);
        assert_eq!(states[0].fault_pct, 25.0);
        assert_eq!(states[0].faults_overlapping_run, 0);
    }
}
