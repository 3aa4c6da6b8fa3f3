// ==========================================
// 精整线时序合成 - 产线配置档
// ==========================================
// 职责: 工序顺序 / 瓶颈 / 公辅设备 / 基础时长 / 班组系数 / 规格带
// 说明: 全部为不可变查表数据, 不写成代码分支
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 均匀分布区间 [low, high]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub low: f64,
    pub high: f64,
}

impl UniformRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }
}

/// 规格带阈值与系数区间
///
/// - 薄且窄: thickness <= thin_max 且 width <= narrow_max
/// - 厚且宽: thickness > thick_min 且 width > wide_min
/// - 其余（含 2.0~3.0mm / 1300~1400mm 死区）: 基准
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductMixBands {
    pub thin_max_thickness_mm: f64,
    pub narrow_max_width_mm: f64,
    pub thick_min_thickness_mm: f64,
    pub wide_min_width_mm: f64,
    pub thin_narrow_factor: UniformRange,
    pub thick_wide_factor: UniformRange,
    pub baseline_factor: UniformRange,
    pub missing_dimension_factor: f64,
}

impl Default for ProductMixBands {
    fn default() -> Self {
        Self {
            thin_max_thickness_mm: 2.0,
            narrow_max_width_mm: 1300.0,
            thick_min_thickness_mm: 3.0,
            wide_min_width_mm: 1400.0,
            thin_narrow_factor: UniformRange::new(0.5, 0.7),
            thick_wide_factor: UniformRange::new(1.1, 1.3),
            baseline_factor: UniformRange::new(0.9, 1.1),
            missing_dimension_factor: 1.0,
        }
    }
}

// ==========================================
// LineProfile - 产线配置档
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineProfile {
    /// 设备名 → 工序号（入口到出口）
    pub process_order: BTreeMap<String, u32>,
    /// 瓶颈候选设备
    pub bottlenecks: BTreeSet<String>,
    /// 非产线/公辅设备（is_active = false）
    pub non_line: BTreeSet<String>,
    /// 建维度表时排除的名称关键字（大小写不敏感）
    pub exclusion_keywords: Vec<String>,
    /// 区段划分: 工序号 <= entry_max → ENTRY, <= centre_max → CENTRE, 其余 EXIT
    pub entry_section_max_order: u32,
    pub centre_section_max_order: u32,
    /// 每卷基础作业时长（秒）
    pub duration_ranges: BTreeMap<String, UniformRange>,
    pub default_duration_range: UniformRange,
    /// 班组效率系数
    pub shift_multipliers: BTreeMap<String, f64>,
    pub default_shift_multiplier: f64,
    /// 瓶颈时长放大系数
    pub bottleneck_inflation: f64,
    /// 排队时长（秒）
    pub bottleneck_queue_range: UniformRange,
    pub standard_queue_range: UniformRange,
    pub product_mix: ProductMixBands,
}

const LINE_SEQUENCE: &[(&str, u32, (f64, f64), bool)] = &[
    ("Entry Coil Car", 1, (40.0, 80.0), false),
    ("Coil Prep Sattion", 2, (30.0, 60.0), false),
    ("Decoiler", 3, (60.0, 120.0), true),
    ("Entry Guide Table", 4, (10.0, 20.0), false),
    ("Entry SnubberHold Down & Pressure Rolls", 5, (20.0, 40.0), false),
    ("Entry & Exit Feed Table", 6, (20.0, 40.0), false),
    ("Pinch Roll & Bending Unit", 7, (30.0, 60.0), false),
    ("Flattener, Pinch & Deflator Rolls", 8, (40.0, 90.0), false),
    ("Temper Mill Unit", 9, (120.0, 240.0), true),
    ("Crop Shear", 10, (20.0, 40.0), true),
    ("Recoiler", 11, (60.0, 120.0), true),
    ("First Conveyor", 12, (10.0, 20.0), false),
    ("Second Conveyor", 13, (10.0, 20.0), false),
    ("Scale M65 (conveyor)", 14, (40.0, 90.0), true),
    ("Delivery Conveyor", 15, (20.0, 40.0), false),
    ("Exit Coil Car", 16, (60.0, 120.0), true),
    ("Strapping Machine", 17, (40.0, 80.0), false),
];

const NON_LINE: &[&str] = &[
    "CCTV Camera",
    "Central Hyd System",
    "Common Equipment",
    "Computer Room",
    "Cranes",
    "Electrical Basement",
    "Farval Systems",
    "General",
    "Lube System",
    "Main Mill Hyd System",
    "Operation",
    "Operations",
    "Pulpits",
    "Roll Shop",
    "Services",
    "Shutdown",
];

const EXCLUSION_KEYWORDS: &[&str] = &[
    "CRANE",
    "CCTV",
    "COMPUTER ROOM",
    "GENERAL",
    "OPERATION",
    "SHUTDOWN",
    "SERVICES",
];

impl Default for LineProfile {
    fn default() -> Self {
        let process_order = LINE_SEQUENCE
            .iter()
            .map(|(name, order, _, _)| (name.to_string(), *order))
            .collect();
        let duration_ranges = LINE_SEQUENCE
            .iter()
            .map(|(name, _, (low, high), _)| (name.to_string(), UniformRange::new(*low, *high)))
            .collect();
        let bottlenecks = LINE_SEQUENCE
            .iter()
            .filter(|(_, _, _, bottleneck)| *bottleneck)
            .map(|(name, _, _, _)| name.to_string())
            .collect();

        let shift_multipliers = [("A", 1.05), ("B", 1.00), ("C", 0.95), ("D", 1.00)]
            .into_iter()
            .map(|(code, factor)| (code.to_string(), factor))
            .collect();

        Self {
            process_order,
            bottlenecks,
            non_line: NON_LINE.iter().map(|s| s.to_string()).collect(),
            exclusion_keywords: EXCLUSION_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            entry_section_max_order: 6,
            centre_section_max_order: 11,
            duration_ranges,
            default_duration_range: UniformRange::new(20.0, 40.0),
            shift_multipliers,
            default_shift_multiplier: 1.0,
            bottleneck_inflation: 1.10,
            bottleneck_queue_range: UniformRange::new(20.0, 60.0),
            standard_queue_range: UniformRange::new(0.0, 20.0),
            product_mix: ProductMixBands::default(),
        }
    }
}

impl LineProfile {
    /// 检查配置档自洽性, 返回第一处问题描述
    pub fn validate(&self) -> Result<(), String> {
        if self.entry_section_max_order >= self.centre_section_max_order {
            return Err(format!(
                "区段边界非法: entry_max={} >= centre_max={}",
                self.entry_section_max_order, self.centre_section_max_order
            ));
        }

        for (name, range) in &self.duration_ranges {
            if !range.is_valid() || range.low <= 0.0 {
                return Err(format!("设备 {} 的基础时长区间非法: {:?}", name, range));
            }
        }
        if !self.default_duration_range.is_valid() || self.default_duration_range.low <= 0.0 {
            return Err("默认时长区间非法".to_string());
        }

        for (code, factor) in &self.shift_multipliers {
            if !(factor.is_finite() && *factor > 0.0) {
                return Err(format!("班组 {} 系数非法: {}", code, factor));
            }
        }
        if !(self.bottleneck_inflation.is_finite() && self.bottleneck_inflation > 0.0) {
            return Err("瓶颈放大系数必须为正".to_string());
        }

        let mix = &self.product_mix;
        for range in [
            mix.thin_narrow_factor,
            mix.thick_wide_factor,
            mix.baseline_factor,
        ] {
            if !range.is_valid() || range.low <= 0.0 {
                return Err(format!("规格带系数区间非法: {:?}", range));
            }
        }

        for range in [self.bottleneck_queue_range, self.standard_queue_range] {
            if !range.is_valid() || range.low < 0.0 {
                return Err(format!("排队时长区间非法: {:?}", range));
            }
        }

        Ok(())
    }
}
