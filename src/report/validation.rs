// ==========================================
// 精整线时序合成 - 合成结果校验
// ==========================================
// 检查项:
// - 零漂移: 每卷末工序结束 == completion_ts, 卷级 end == completion_ts
// - 连续性: 卷内相邻工序首尾相接, 首工序开始 == 卷级 start
// - 正时长: 工序时长 > 0, 事件时长 >= 0
// - 间隔清洗残留: 负间隔 / 超阈值间隔
// ==========================================

use crate::config::GapPolicy;
use crate::domain::event::EquipmentEvent;
use crate::domain::production::ProductionCoil;
use crate::engine::operation_synth::OperationSynthesis;
use serde::Serialize;
use tracing::{info, warn};

const MAX_SAMPLES: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub coils_checked: usize,
    pub max_drift_us: i64,
    pub drifted_coils: usize,
    pub contiguity_breaks: usize,
    pub coil_window_mismatches: usize,
    pub non_positive_operations: usize,
    pub negative_event_durations: usize,
    pub remaining_negative_gaps: usize,
    pub completion_gaps_over_cap: usize,
    pub parent_gaps_over_cap: usize,
    /// 前若干条违规描述
    pub samples: Vec<String>,
    pub passed: bool,
}

impl ValidationReport {
    pub fn evaluate(
        synthesis: &OperationSynthesis,
        coils: &[ProductionCoil],
        events: &[EquipmentEvent],
        policy: &GapPolicy,
    ) -> Self {
        let mut report = Self::default();

        // 合成窗口与已合成卷同序（卷号可重复, 按位置对应）
        let mut synthesized = coils.iter().filter(|c| c.start_datetime.is_some());

        // === 步骤 1: 卷内时间线 ===
        for (window, ops) in synthesis.per_coil() {
            report.coils_checked += 1;

            let drift_us = ops
                .last()
                .and_then(|op| (op.operation_end_ts - window.completion_ts).num_microseconds())
                .map_or(i64::MAX, i64::abs);
            report.max_drift_us = report.max_drift_us.max(drift_us);
            if drift_us != 0 || window.end != window.completion_ts {
                report.drifted_coils += 1;
                report.sample(format!("{}: 末工序结束偏离完工时间 {}us", window.coil_id, drift_us));
            }

            if ops.first().map(|op| op.operation_start_ts) != Some(window.start) {
                report.contiguity_breaks += 1;
                report.sample(format!("{}: 首工序开始与卷级开始不一致", window.coil_id));
            }
            for pair in ops.windows(2) {
                if pair[0].operation_end_ts != pair[1].operation_start_ts {
                    report.contiguity_breaks += 1;
                    report.sample(format!(
                        "{}: {} → {} 不连续",
                        window.coil_id, pair[0].equipment_name, pair[1].equipment_name
                    ));
                }
            }

            for op in ops.iter().filter(|op| op.operation_duration_sec <= 0.0) {
                report.non_positive_operations += 1;
                report.sample(format!("{}: {} 时长非正", op.coil_id, op.equipment_name));
            }

            let coil_matches = synthesized.next().map_or(false, |c| {
                c.coil_id == window.coil_id
                    && c.start_datetime == Some(window.start)
                    && c.end_datetime == Some(window.end)
            });
            if !coil_matches {
                report.coil_window_mismatches += 1;
            }
        }

        // === 步骤 2: 事件时长 ===
        report.negative_event_durations = events
            .iter()
            .filter(|e| e.event_duration_sec < 0.0 || e.event_end_ts < e.event_start_ts)
            .count();

        // === 步骤 3: 间隔清洗残留 ===
        for coil in coils {
            if let Some(gap) = coil.gap_from_prev_completion_min {
                if gap < 0.0 {
                    report.remaining_negative_gaps += 1;
                } else if gap > policy.completion_gap_cap_min {
                    report.completion_gaps_over_cap += 1;
                }
            }
            if let Some(gap) = coil.gap_from_prev_parent_min {
                if gap < 0.0 {
                    report.remaining_negative_gaps += 1;
                } else if gap > policy.parent_gap_cap_min {
                    report.parent_gaps_over_cap += 1;
                }
            }
        }

        report.passed = report.violation_count() == 0;

        if report.passed {
            info!(coils = report.coils_checked, "合成结果校验通过");
        } else {
            warn!(
                drifted = report.drifted_coils,
                contiguity = report.contiguity_breaks,
                non_positive = report.non_positive_operations,
                negative_events = report.negative_event_durations,
                gap_residue = report.remaining_negative_gaps
                    + report.completion_gaps_over_cap
                    + report.parent_gaps_over_cap,
                "合成结果校验未通过"
            );
        }
        report
    }

    pub fn violation_count(&self) -> usize {
        self.drifted_coils
            + self.contiguity_breaks
            + self.coil_window_mismatches
            + self.non_positive_operations
            + self.negative_event_durations
            + self.remaining_negative_gaps
            + self.completion_gaps_over_cap
            + self.parent_gaps_over_cap
    }

    fn sample(&mut self, message: String) {
        if self.samples.len() < MAX_SAMPLES {
            self.samples.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operation::CoilOperation;
    use crate::engine::operation_synth::CoilWindow;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn op(start: NaiveDateTime, end: NaiveDateTime) -> CoilOperation {
        CoilOperation {
            coil_id: "U1".to_string(),
            parent_coil_id: "P1".to_string(),
            equipment_id: 1,
            equipment_name: "EQ".to_string(),
            production_date: None,
            shift_code: "A".to_string(),
            operation_start_ts: start,
            operation_end_ts: end,
            operation_duration_sec: (end - start).num_seconds() as f64,
            queue_time_sec: 0.0,
            is_bottleneck_step: false,
            type_code: None,
            is_prime: false,
            is_scrap: false,
        }
    }

    fn synthesis(ops: Vec<CoilOperation>, completion: NaiveDateTime) -> OperationSynthesis {
        OperationSynthesis {
            line_length: ops.len(),
            windows: vec![CoilWindow {
                coil_id: "U1".to_string(),
                completion_ts: completion,
                start: ops[0].operation_start_ts,
                end: completion,
            }],
            operations: ops,
            processed: 1,
            skipped_coil_ids: vec![],
        }
    }

    #[test]
    fn test_detects_drift_and_gap() {
        let ops = vec![op(ts(9, 0), ts(9, 5)), op(ts(9, 6), ts(9, 10))];
        let synth = synthesis(ops, ts(10, 0));

        let report = ValidationReport::evaluate(&synth, &[], &[], &GapPolicy::default());
        assert!(!report.passed);
        assert_eq!(report.drifted_coils, 1);
        assert_eq!(report.max_drift_us, 3_000_000_000);
        assert_eq!(report.contiguity_breaks, 1);
        assert!(!report.samples.is_empty());
    }
}
