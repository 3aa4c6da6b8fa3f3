// ==========================================
// 精整线时序合成 - 作业时长模型
// ==========================================
// 职责: 按设备/瓶颈/班组/规格抽取单卷作业时长
// 公式: duration = U(设备区间) × 瓶颈系数 × 班组系数 × 规格系数
// 说明: 随机源由调用方注入, 同一种子同一输入结果可复现
// ==========================================

use crate::config::{LineProfile, UniformRange};
use crate::domain::equipment::Equipment;
use crate::domain::types::ProductBand;
use rand::Rng;

// ==========================================
// DurationModel - 时长模型（只读配置档）
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct DurationModel<'a> {
    profile: &'a LineProfile,
}

impl<'a> DurationModel<'a> {
    pub fn new(profile: &'a LineProfile) -> Self {
        Self { profile }
    }

    /// 设备基础时长区间（未配置的设备取默认区间）
    pub fn get_duration_range(&self, equipment_name: &str) -> UniformRange {
        self.profile
            .duration_ranges
            .get(equipment_name)
            .copied()
            .unwrap_or(self.profile.default_duration_range)
    }

    /// 规格带判定（厚度/宽度任一缺失 → UNKNOWN）
    pub fn classify_band(&self, thickness_mm: Option<f64>, width_mm: Option<f64>) -> ProductBand {
        let (Some(t), Some(w)) = (thickness_mm, width_mm) else {
            return ProductBand::Unknown;
        };
        let bands = &self.profile.product_mix;
        if t <= bands.thin_max_thickness_mm && w <= bands.narrow_max_width_mm {
            ProductBand::ThinNarrow
        } else if t > bands.thick_min_thickness_mm && w > bands.wide_min_width_mm {
            ProductBand::ThickWide
        } else {
            ProductBand::Baseline
        }
    }

    /// 规格系数: 按规格带从对应区间抽取, 缺失规格取固定系数
    pub fn product_mix_factor<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        thickness_mm: Option<f64>,
        width_mm: Option<f64>,
    ) -> f64 {
        let bands = &self.profile.product_mix;
        match self.classify_band(thickness_mm, width_mm) {
            ProductBand::ThinNarrow => draw_uniform(rng, bands.thin_narrow_factor),
            ProductBand::ThickWide => draw_uniform(rng, bands.thick_wide_factor),
            ProductBand::Baseline => draw_uniform(rng, bands.baseline_factor),
            ProductBand::Unknown => bands.missing_dimension_factor,
        }
    }

    /// 班组系数（未知班组取默认系数）
    pub fn shift_multiplier(&self, shift_code: &str) -> f64 {
        self.profile
            .shift_multipliers
            .get(shift_code)
            .copied()
            .unwrap_or(self.profile.default_shift_multiplier)
    }

    /// 抽取单卷在某设备上的作业时长（秒, 恒为正）
    pub fn draw_duration_seconds<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        equipment_name: &str,
        is_bottleneck: bool,
        shift_code: &str,
        thickness_mm: Option<f64>,
        width_mm: Option<f64>,
    ) -> f64 {
        let base = draw_uniform(rng, self.get_duration_range(equipment_name));
        let bottleneck = if is_bottleneck {
            self.profile.bottleneck_inflation
        } else {
            1.0
        };
        let mix = self.product_mix_factor(rng, thickness_mm, width_mm);

        base * bottleneck * self.shift_multiplier(shift_code) * mix
    }

    /// 抽取排队时长（秒）
    ///
    /// 卷内时间线不插入排队, 此接口供外部仿真复用
    pub fn draw_queue_seconds<R: Rng + ?Sized>(&self, rng: &mut R, is_bottleneck: bool) -> f64 {
        let range = if is_bottleneck {
            self.profile.bottleneck_queue_range
        } else {
            self.profile.standard_queue_range
        };
        draw_uniform(rng, range)
    }
}

fn draw_uniform<R: Rng + ?Sized>(rng: &mut R, range: UniformRange) -> f64 {
    if range.high <= range.low {
        return range.low;
    }
    rng.gen_range(range.low..=range.high)
}

// ==========================================
// DurationSampler Trait - 时长来源
// ==========================================
// 合成器只依赖此接口; 测试可注入固定时长
pub trait DurationSampler {
    fn sample_seconds(
        &mut self,
        equipment: &Equipment,
        shift_code: &str,
        thickness_mm: Option<f64>,
        width_mm: Option<f64>,
    ) -> f64;
}

/// 基于时长模型的随机抽样器
pub struct RandomDurationSampler<'a, R: Rng> {
    model: DurationModel<'a>,
    rng: R,
}

impl<'a, R: Rng> RandomDurationSampler<'a, R> {
    pub fn new(profile: &'a LineProfile, rng: R) -> Self {
        Self {
            model: DurationModel::new(profile),
            rng,
        }
    }
}

impl<'a, R: Rng> DurationSampler for RandomDurationSampler<'a, R> {
    fn sample_seconds(
        &mut self,
        equipment: &Equipment,
        shift_code: &str,
        thickness_mm: Option<f64>,
        width_mm: Option<f64>,
    ) -> f64 {
        self.model.draw_duration_seconds(
            &mut self.rng,
            &equipment.equipment_name,
            equipment.is_bottleneck_candidate,
            shift_code,
            thickness_mm,
            width_mm,
        )
    }
}

/// 固定时长抽样器: 按设备名查表, 未命中取默认值
#[derive(Debug, Clone, Default)]
pub struct FixedDurationSampler {
    pub by_equipment: std::collections::HashMap<String, f64>,
    pub default_seconds: f64,
}

impl FixedDurationSampler {
    pub fn uniform(seconds: f64) -> Self {
        Self {
            by_equipment: Default::default(),
            default_seconds: seconds,
        }
    }

    pub fn with(mut self, equipment_name: &str, seconds: f64) -> Self {
        self.by_equipment.insert(equipment_name.to_string(), seconds);
        self
    }
}

impl DurationSampler for FixedDurationSampler {
    fn sample_seconds(
        &mut self,
        equipment: &Equipment,
        _shift_code: &str,
        _thickness_mm: Option<f64>,
        _width_mm: Option<f64>,
    ) -> f64 {
        self.by_equipment
            .get(&equipment.equipment_name)
            .copied()
            .unwrap_or(self.default_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_band_boundaries() {
        let profile = LineProfile::default();
        let model = DurationModel::new(&profile);

        assert_eq!(model.classify_band(Some(2.0), Some(1300.0)), ProductBand::ThinNarrow);
        assert_eq!(model.classify_band(Some(3.0), Some(1500.0)), ProductBand::Baseline);
        assert_eq!(model.classify_band(Some(3.01), Some(1400.01)), ProductBand::ThickWide);
        assert_eq!(model.classify_band(Some(2.5), Some(1350.0)), ProductBand::Baseline);
        assert_eq!(model.classify_band(None, Some(1200.0)), ProductBand::Unknown);
    }

    #[test]
    fn test_baseline_band_edges() {
        let profile = LineProfile::default();
        let model = DurationModel::new(&profile);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        // 仅厚度越过薄窄上限 / 仅宽度越过 / 厚宽下限本身
        let edges = [
            (2.1, 1300.0),
            (2.0, 1300.01),
            (3.0, 1500.0),
            (3.5, 1400.0),
        ];
        for (t, w) in edges {
            assert_eq!(model.classify_band(Some(t), Some(w)), ProductBand::Baseline);
            for _ in 0..100 {
                let factor = model.product_mix_factor(&mut rng, Some(t), Some(w));
                assert!((0.9..=1.1).contains(&factor), "t={t} w={w} factor={factor}");
            }
        }
    }

    #[test]
    fn test_product_mix_factor_ranges() {
        let profile = LineProfile::default();
        let model = DurationModel::new(&profile);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..200 {
            let thin = model.product_mix_factor(&mut rng, Some(1.8), Some(1250.0));
            assert!((0.5..=0.7).contains(&thin));
            let thick = model.product_mix_factor(&mut rng, Some(3.5), Some(1500.0));
            assert!((1.1..=1.3).contains(&thick));
            let base = model.product_mix_factor(&mut rng, Some(2.5), Some(1350.0));
            assert!((0.9..=1.1).contains(&base));
        }
        assert_eq!(model.product_mix_factor(&mut rng, None, None), 1.0);
    }

    #[test]
    fn test_duration_bounds_for_bottleneck() {
        let profile = LineProfile::default();
        let model = DurationModel::new(&profile);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        // Temper Mill Unit: [120,240] × 1.10 × C班 0.95 × 缺失规格 1.0
        for _ in 0..200 {
            let d = model.draw_duration_seconds(&mut rng, "Temper Mill Unit", true, "C", None, None);
            assert!(d >= 120.0 * 1.10 * 0.95 - 1e-9);
            assert!(d <= 240.0 * 1.10 * 0.95 + 1e-9);
        }
    }

    #[test]
    fn test_unknown_equipment_and_shift_defaults() {
        let profile = LineProfile::default();
        let model = DurationModel::new(&profile);
        assert_eq!(model.get_duration_range("Mystery Unit"), UniformRange::new(20.0, 40.0));
        assert_eq!(model.shift_multiplier("Z"), 1.0);
        assert_eq!(model.shift_multiplier("A"), 1.05);
    }

    #[test]
    fn test_queue_ranges() {
        let profile = LineProfile::default();
        let model = DurationModel::new(&profile);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            assert!((20.0..=60.0).contains(&model.draw_queue_seconds(&mut rng, true)));
            assert!((0.0..=20.0).contains(&model.draw_queue_seconds(&mut rng, false)));
        }
    }

    #[test]
    fn test_same_seed_same_draws() {
        let profile = LineProfile::default();
        let model = DurationModel::new(&profile);
        let mut a = ChaCha8Rng::seed_from_u64(11);
        let mut b = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..20 {
            assert_eq!(
                model.draw_duration_seconds(&mut a, "Decoiler", true, "A", Some(2.5), Some(1200.0)),
                model.draw_duration_seconds(&mut b, "Decoiler", true, "A", Some(2.5), Some(1200.0))
            );
        }
    }
}
