// ==========================================
// 精整线时序合成 - 生产卷事实构建
// ==========================================
// 职责: 中间记录 → ProductionCoil
// 步骤: 主键补位 → 品质分类 → 按完工时间稳定排序 → 节奏间隔推导
// 口径:
// - 缺 UID/CID 的行保留, 缺失键记为 "nan" 并计数
// - 完工时间缺失的卷排在最后, 不参与时间线合成
// - 完工间隔 = 本卷完工 - 上一卷完工（任一缺失则为空）
// - 母卷间隔 = 本母卷首卷完工 - 上一母卷末卷完工（母卷按首卷完工排序）
// ==========================================

use crate::config::ProductClassification;
use crate::domain::production::{ProductionCoil, RawProductionRecord};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

/// 缺失卷号/母卷号的占位值
pub const MISSING_ID: &str = "nan";

/// 生产卷事实构建结果
#[derive(Debug, Clone, Default)]
pub struct CoilFactBuild {
    /// 按完工时间排序（缺失在后）
    pub coils: Vec<ProductionCoil>,
    /// 缺 UID 或 CID（以占位值保留）的行数
    pub missing_id: usize,
}

pub struct CoilFactBuilder<'a> {
    product: &'a ProductClassification,
}

impl<'a> CoilFactBuilder<'a> {
    pub fn new(product: &'a ProductClassification) -> Self {
        Self { product }
    }

    pub fn build(&self, records: Vec<RawProductionRecord>) -> CoilFactBuild {
        let mut missing_id = 0usize;

        // === 步骤 1: 主键补位 + 品质分类 ===
        let mut coils: Vec<ProductionCoil> = records
            .into_iter()
            .map(|record| {
                if record.coil_id.is_none() || record.parent_coil_id.is_none() {
                    missing_id += 1;
                    warn!(row = record.row_number, "生产行缺少 UID/CID, 以占位值保留");
                }
                let coil_id = record
                    .coil_id
                    .clone()
                    .unwrap_or_else(|| MISSING_ID.to_string());
                let parent_coil_id = record
                    .parent_coil_id
                    .clone()
                    .unwrap_or_else(|| MISSING_ID.to_string());
                self.to_coil(record, coil_id, parent_coil_id)
            })
            .collect();

        // === 步骤 2: 稳定排序 ===
        coils.sort_by(|a, b| compare_completion(a.completion_ts, b.completion_ts));

        // === 步骤 3: 节奏间隔 ===
        derive_completion_gaps(&mut coils);
        derive_parent_gaps(&mut coils);

        info!(
            coils = coils.len(),
            missing_id,
            missing_completion = coils.iter().filter(|c| c.completion_ts.is_none()).count(),
            prime = coils.iter().filter(|c| c.is_prime).count(),
            scrap = coils.iter().filter(|c| c.is_scrap).count(),
            "生产卷事实构建完成"
        );

        CoilFactBuild {
            coils,
            missing_id,
        }
    }

    fn to_coil(
        &self,
        record: RawProductionRecord,
        coil_id: String,
        parent_coil_id: String,
    ) -> ProductionCoil {
        let type_code = record.type_code;
        ProductionCoil {
            coil_id,
            parent_coil_id,
            production_date: record.completion_ts.map(|ts| ts.date()),
            completion_ts: record.completion_ts,
            shift_code: None,
            thickness_mm: record.thickness_mm,
            width_mm: record.width_mm,
            mass_out_tons: record.mass_out_tons,
            hours: record.hours,
            grade: record.grade,
            next_process: record.next_process,
            is_prime: self.product.is_prime(type_code.as_deref()),
            is_scrap: self.product.is_scrap(type_code.as_deref()),
            type_code,
            gap_from_prev_completion_min: None,
            gap_from_prev_parent_min: None,
            cast: record.cast,
            slab: record.slab,
            start_datetime: None,
            end_datetime: None,
            total_cycle_time_min: None,
        }
    }
}

/// 完工时间比较: 缺失值排在最后
pub fn compare_completion(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn minutes_between(later: NaiveDateTime, earlier: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}

/// 完工间隔（分钟）, 要求 coils 已排序
pub fn derive_completion_gaps(coils: &mut [ProductionCoil]) {
    let mut prev: Option<NaiveDateTime> = None;
    for (idx, coil) in coils.iter_mut().enumerate() {
        coil.gap_from_prev_completion_min = match (idx, prev, coil.completion_ts) {
            (0, _, _) => None,
            (_, Some(p), Some(c)) => Some(minutes_between(c, p)),
            _ => None,
        };
        prev = coil.completion_ts;
    }
}

/// 母卷间隔（分钟）, 同母卷下所有分卷取相同值
pub fn derive_parent_gaps(coils: &mut [ProductionCoil]) {
    // 母卷 → (首卷完工, 末卷完工)
    let gaps: HashMap<String, Option<f64>> = {
        let mut spans: BTreeMap<&str, (Option<NaiveDateTime>, Option<NaiveDateTime>)> = BTreeMap::new();
        for coil in coils.iter() {
            let span = spans.entry(coil.parent_coil_id.as_str()).or_insert((None, None));
            if let Some(ts) = coil.completion_ts {
                span.0 = Some(span.0.map_or(ts, |first| first.min(ts)));
                span.1 = Some(span.1.map_or(ts, |last| last.max(ts)));
            }
        }

        let mut ordered: Vec<(&str, Option<NaiveDateTime>, Option<NaiveDateTime>)> = spans
            .into_iter()
            .map(|(parent, (first, last))| (parent, first, last))
            .collect();
        ordered.sort_by(|a, b| compare_completion(a.1, b.1));

        let mut gaps: HashMap<String, Option<f64>> = HashMap::with_capacity(ordered.len());
        let mut prev_last: Option<NaiveDateTime> = None;
        for (idx, (parent, first, last)) in ordered.iter().enumerate() {
            let gap = match (idx, prev_last, *first) {
                (0, _, _) => None,
                (_, Some(p), Some(f)) => Some(minutes_between(f, p)),
                _ => None,
            };
            gaps.insert(parent.to_string(), gap);
            prev_last = *last;
        }
        gaps
    };

    for coil in coils.iter_mut() {
        coil.gap_from_prev_parent_min = gaps.get(&coil.parent_coil_id).copied().flatten();
    }
}
