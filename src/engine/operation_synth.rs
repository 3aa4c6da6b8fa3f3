// ==========================================
// 精整线时序合成 - 卷材工序时间线合成
// ==========================================
// 职责: 为每个有完工时间的卷生成产线逐工序作业记录
// 锚定规则:
// - 时长在微秒整数域累加: start = completion - Σd
// - 工序首尾相接, 末工序结束时刻精确等于 completion_ts
// - 卷内不插排队, queue_time_sec 恒为 0
// 红线: 合成时间只能由 MES 完工时间反推, 不得向前漂移
// ==========================================

use crate::config::ShiftWindow;
use crate::domain::equipment::Equipment;
use crate::domain::operation::CoilOperation;
use crate::domain::production::ProductionCoil;
use crate::engine::crew_rotation::CrewSchedule;
use crate::engine::duration::DurationSampler;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

/// 秒 → 微秒（四舍五入）
pub fn seconds_to_micros(seconds: f64) -> i64 {
    (seconds * 1_000_000.0).round() as i64
}

/// 微秒 → 秒
pub fn micros_to_seconds(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}

// ==========================================
// AnchoredTimeline - 锚定时间线
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredTimeline {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// 各工序 [开始, 结束)
    pub steps: Vec<(NaiveDateTime, NaiveDateTime)>,
    /// 各工序时长（微秒, 至少 1）
    pub durations_us: Vec<i64>,
}

impl AnchoredTimeline {
    pub fn total_micros(&self) -> i64 {
        self.durations_us.iter().sum()
    }
}

/// 由完工时刻与各工序时长反推时间线
///
/// 末工序结束时刻直接取 completion_ts, 不做浮点累加
pub fn anchor_timeline(completion_ts: NaiveDateTime, durations_sec: &[f64]) -> AnchoredTimeline {
    let durations_us: Vec<i64> = durations_sec
        .iter()
        .map(|d| seconds_to_micros(*d).max(1))
        .collect();
    let total: i64 = durations_us.iter().sum();
    let start = completion_ts - Duration::microseconds(total);

    let last = durations_us.len().saturating_sub(1);
    let mut cursor = start;
    let steps = durations_us
        .iter()
        .enumerate()
        .map(|(idx, d)| {
            let step_end = if idx == last {
                completion_ts
            } else {
                cursor + Duration::microseconds(*d)
            };
            let step = (cursor, step_end);
            cursor = step_end;
            step
        })
        .collect();

    AnchoredTimeline {
        start,
        end: completion_ts,
        steps,
        durations_us,
    }
}

/// 单卷合成窗口（校验用）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoilWindow {
    pub coil_id: String,
    pub completion_ts: NaiveDateTime,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// 合成结果
#[derive(Debug, Clone, Default)]
pub struct OperationSynthesis {
    /// 按卷分段连续排列, 每段长度 = line_length
    pub operations: Vec<CoilOperation>,
    /// 与 operations 分段一一对应
    pub windows: Vec<CoilWindow>,
    pub line_length: usize,
    pub processed: usize,
    pub skipped_coil_ids: Vec<String>,
}

impl OperationSynthesis {
    /// 按卷迭代 (窗口, 工序段)
    pub fn per_coil(&self) -> impl Iterator<Item = (&CoilWindow, &[CoilOperation])> {
        self.windows
            .iter()
            .zip(self.operations.chunks(self.line_length.max(1)))
    }
}

// ==========================================
// OperationSynthesizer - 工序时间线合成器
// ==========================================
pub struct OperationSynthesizer<'a> {
    line: &'a [&'a Equipment],
    crews: &'a CrewSchedule,
    shift_window: ShiftWindow,
}

impl<'a> OperationSynthesizer<'a> {
    pub fn new(line: &'a [&'a Equipment], crews: &'a CrewSchedule, shift_window: ShiftWindow) -> Self {
        Self {
            line,
            crews,
            shift_window,
        }
    }

    /// 合成全部卷的工序记录, 并回写卷的 shift/start/end/cycle
    ///
    /// 完工时间缺失的卷跳过, 其合成字段保持为空
    pub fn synthesize<S: DurationSampler + ?Sized>(
        &self,
        coils: &mut [ProductionCoil],
        sampler: &mut S,
    ) -> OperationSynthesis {
        let mut result = OperationSynthesis {
            operations: Vec::with_capacity(coils.len() * self.line.len()),
            line_length: self.line.len(),
            ..Default::default()
        };

        for coil in coils.iter_mut() {
            let Some(completion_ts) = coil.completion_ts else {
                debug!(coil_id = %coil.coil_id, "完工时间缺失, 跳过合成");
                result.skipped_coil_ids.push(coil.coil_id.clone());
                continue;
            };

            let shift_code = self
                .crews
                .shift_code_for(completion_ts, &self.shift_window)
                .to_string();

            // === 步骤 1: 抽取各工序时长 ===
            let durations: Vec<f64> = self
                .line
                .iter()
                .map(|eq| sampler.sample_seconds(eq, &shift_code, coil.thickness_mm, coil.width_mm))
                .collect();

            // === 步骤 2: 锚定反推 ===
            let timeline = anchor_timeline(completion_ts, &durations);

            // === 步骤 3: 生成工序记录 ===
            for ((eq, (step_start, step_end)), d_us) in self
                .line
                .iter()
                .zip(timeline.steps.iter())
                .zip(timeline.durations_us.iter())
            {
                result.operations.push(CoilOperation {
                    coil_id: coil.coil_id.clone(),
                    parent_coil_id: coil.parent_coil_id.clone(),
                    equipment_id: eq.equipment_id,
                    equipment_name: eq.equipment_name.clone(),
                    production_date: coil.production_date,
                    shift_code: shift_code.clone(),
                    operation_start_ts: *step_start,
                    operation_end_ts: *step_end,
                    operation_duration_sec: micros_to_seconds(*d_us),
                    queue_time_sec: 0.0,
                    is_bottleneck_step: eq.is_bottleneck_candidate,
                    type_code: coil.type_code.clone(),
                    is_prime: coil.is_prime,
                    is_scrap: coil.is_scrap,
                });
            }

            // === 步骤 4: 回写卷级字段 ===
            coil.shift_code = Some(shift_code);
            coil.start_datetime = Some(timeline.start);
            coil.end_datetime = Some(timeline.end);
            coil.total_cycle_time_min = Some(micros_to_seconds(timeline.total_micros()) / 60.0);

            result.windows.push(CoilWindow {
                coil_id: coil.coil_id.clone(),
                completion_ts,
                start: timeline.start,
                end: timeline.end,
            });
            result.processed += 1;
        }

        info!(
            processed = result.processed,
            skipped = result.skipped_coil_ids.len(),
            operations = result.operations.len(),
            line_length = result.line_length,
            "工序时间线合成完成"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineProfile;
    use crate::engine::duration::{FixedDurationSampler, RandomDurationSampler};
    use crate::engine::topology::LineTopology;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn coil(id: &str, completion: Option<NaiveDateTime>) -> ProductionCoil {
        ProductionCoil {
            coil_id: id.to_string(),
            parent_coil_id: "P1".to_string(),
            production_date: completion.map(|c| c.date()),
            completion_ts: completion,
            shift_code: None,
            thickness_mm: Some(2.5),
            width_mm: Some(1250.0),
            mass_out_tons: Some(12.0),
            hours: None,
            grade: None,
            next_process: None,
            type_code: Some("HL".to_string()),
            is_prime: true,
            is_scrap: false,
            gap_from_prev_completion_min: None,
            gap_from_prev_parent_min: None,
            cast: None,
            slab: None,
            start_datetime: None,
            end_datetime: None,
            total_cycle_time_min: None,
        }
    }

    fn full_line_topology(profile: &LineProfile) -> LineTopology {
        LineTopology::build(profile.process_order.keys().map(|k| k.as_str()), profile)
    }

    #[test]
    fn test_anchor_timeline_is_contiguous_and_exact() {
        let completion = ts(10, 0, 0);
        let timeline = anchor_timeline(completion, &[50.123_456_7, 0.0, 100.5]);

        assert_eq!(timeline.durations_us, vec![50_123_457, 1, 100_500_000]);
        assert_eq!(timeline.end, completion);
        assert_eq!(timeline.steps.last().unwrap().1, completion);
        assert_eq!(timeline.steps[0].0, timeline.start);
        for pair in timeline.steps.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        assert_eq!(
            (completion - timeline.start).num_microseconds(),
            Some(timeline.total_micros())
        );
    }

    #[test]
    fn test_fixed_durations_example_coil() {
        let profile = LineProfile::default();
        let topology = full_line_topology(&profile);
        let line = topology.require_line().unwrap();
        assert_eq!(line.len(), 17);

        let crews = CrewSchedule::build(vec![ts(10, 0, 0).date()], &["A".to_string(), "B".to_string()]);
        let synthesizer = OperationSynthesizer::new(&line, &crews, ShiftWindow::default());

        // 16 道 50s + 调质 100s = 900s
        let mut sampler = FixedDurationSampler::uniform(50.0).with("Temper Mill Unit", 100.0);
        let mut coils = vec![coil("U1", Some(ts(10, 0, 0)))];
        let result = synthesizer.synthesize(&mut coils, &mut sampler);

        assert_eq!(result.operations.len(), 17);
        assert_eq!(coils[0].start_datetime, Some(ts(9, 45, 0)));
        assert_eq!(coils[0].end_datetime, Some(ts(10, 0, 0)));
        assert_eq!(coils[0].total_cycle_time_min, Some(15.0));
        assert_eq!(coils[0].shift_code.as_deref(), Some("A"));

        let first = &result.operations[0];
        assert_eq!(first.equipment_name, "Entry Coil Car");
        assert_eq!(first.operation_start_ts, ts(9, 45, 0));
        assert_eq!(result.operations[16].operation_end_ts, ts(10, 0, 0));
        assert!(result.operations.iter().all(|op| op.queue_time_sec == 0.0));
    }

    #[test]
    fn test_missing_completion_is_skipped() {
        let profile = LineProfile::default();
        let topology = full_line_topology(&profile);
        let line = topology.require_line().unwrap();
        let crews = CrewSchedule::build(vec![ts(10, 0, 0).date()], &["A".to_string()]);
        let synthesizer = OperationSynthesizer::new(&line, &crews, ShiftWindow::default());

        let mut coils = vec![coil("U1", Some(ts(10, 0, 0))), coil("U2", None)];
        let result = synthesizer.synthesize(&mut coils, &mut FixedDurationSampler::uniform(30.0));

        assert_eq!(result.processed, 1);
        assert_eq!(result.skipped_coil_ids, vec!["U2".to_string()]);
        assert_eq!(coils[1].start_datetime, None);
        assert_eq!(coils[1].shift_code, None);
        assert_eq!(result.per_coil().count(), 1);
    }

    #[test]
    fn test_random_durations_anchor_to_completion() {
        let profile = LineProfile::default();
        let topology = full_line_topology(&profile);
        let line = topology.require_line().unwrap();
        let crews = CrewSchedule::build(vec![ts(0, 0, 0).date()], &["A".to_string(), "B".to_string()]);
        let synthesizer = OperationSynthesizer::new(&line, &crews, ShiftWindow::default());

        let mut coils: Vec<ProductionCoil> = (0..50)
            .map(|i| coil(&format!("U{i}"), Some(ts(6 + i / 10, (i % 10) * 5, 0))))
            .collect();
        let mut sampler = RandomDurationSampler::new(&profile, ChaCha8Rng::seed_from_u64(99));
        let result = synthesizer.synthesize(&mut coils, &mut sampler);

        for (window, ops) in result.per_coil() {
            assert_eq!(ops.last().unwrap().operation_end_ts, window.completion_ts);
            assert_eq!(ops.first().unwrap().operation_start_ts, window.start);
            assert!(ops.iter().all(|op| op.operation_duration_sec > 0.0));
            assert!(ops.windows(2).all(|p| p[0].operation_end_ts == p[1].operation_start_ts));
        }
    }
}
