// ==========================================
// 精整线时序合成 - 节奏间隔清洗
// ==========================================
// 规则（按阈值配置）:
// - 负间隔 → 空（乱序/交错）
// - 完工间隔 > completion_gap_cap_min → 空（停机/换班断档）
// - 母卷间隔 > parent_gap_cap_min → 空
// 幂等: 对已清洗数据再次执行不产生任何变化
// ==========================================

use crate::config::GapPolicy;
use crate::domain::production::ProductionCoil;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GapCleaningReport {
    pub negative_completion_gaps: usize,
    pub completion_gaps_over_cap: usize,
    pub negative_parent_gaps: usize,
    pub parent_gaps_over_cap: usize,
}

impl GapCleaningReport {
    pub fn total(&self) -> usize {
        self.negative_completion_gaps
            + self.completion_gaps_over_cap
            + self.negative_parent_gaps
            + self.parent_gaps_over_cap
    }
}

pub struct GapCleaner {
    policy: GapPolicy,
}

impl GapCleaner {
    pub fn new(policy: GapPolicy) -> Self {
        Self { policy }
    }

    pub fn clean(&self, coils: &mut [ProductionCoil]) -> GapCleaningReport {
        let mut report = GapCleaningReport::default();

        for coil in coils.iter_mut() {
            if let Some(gap) = coil.gap_from_prev_completion_min {
                if gap < 0.0 {
                    coil.gap_from_prev_completion_min = None;
                    report.negative_completion_gaps += 1;
                } else if gap > self.policy.completion_gap_cap_min {
                    coil.gap_from_prev_completion_min = None;
                    report.completion_gaps_over_cap += 1;
                }
            }

            if let Some(gap) = coil.gap_from_prev_parent_min {
                if gap < 0.0 {
                    coil.gap_from_prev_parent_min = None;
                    report.negative_parent_gaps += 1;
                } else if gap > self.policy.parent_gap_cap_min {
                    coil.gap_from_prev_parent_min = None;
                    report.parent_gaps_over_cap += 1;
                }
            }
        }

        info!(
            negative_completion = report.negative_completion_gaps,
            completion_over_cap = report.completion_gaps_over_cap,
            negative_parent = report.negative_parent_gaps,
            parent_over_cap = report.parent_gaps_over_cap,
            "节奏间隔清洗完成"
        );
        report
    }
}
