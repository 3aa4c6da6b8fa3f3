// ==========================================
// 精整线时序合成 - 流水线配置
// ==========================================
// 职责: 输入输出路径 / 日期窗口 / 随机种子 / 策略阈值 / 班次划分
// 存储: 可选 JSON 文件, 缺省字段取默认值
// ==========================================

use crate::config::line_profile::LineProfile;
use crate::importer::error::{ImportError, ImportResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

// ==========================================
// 配置键（用于错误定位）
// ==========================================
pub mod config_keys {
    pub const DATE_WINDOW: &str = "date_window";
    pub const CREW_CODES: &str = "crew_codes";
    pub const SHIFT: &str = "shift";
    pub const POLICY: &str = "policy";
    pub const LINE: &str = "line";
    pub const TIMESTAMP_FORMAT: &str = "timestamp_format";
}

/// 日期窗口（两端均包含, 按时间戳比较）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.end
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        let at_midnight = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .unwrap_or_default()
        };
        Self {
            start: at_midnight(2024, 4, 1),
            end: at_midnight(2024, 8, 31),
        }
    }
}

/// 策略阈值（来自现场经验, 不做推导）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapPolicy {
    /// 同设备相邻 RUN 间隔超过该值才记 IDLE（秒）
    pub idle_gap_threshold_sec: f64,
    /// 完工间隔上限（分钟）, 超出置空
    pub completion_gap_cap_min: f64,
    /// 母卷间隔上限（分钟）, 超出置空
    pub parent_gap_cap_min: f64,
}

impl Default for GapPolicy {
    fn default() -> Self {
        Self {
            idle_gap_threshold_sec: 30.0,
            completion_gap_cap_min: 360.0,
            parent_gap_cap_min: 30.0,
        }
    }
}

/// 白班/夜班划分: [day_start_hour, night_start_hour) 为白班
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftWindow {
    pub day_start_hour: u32,
    pub night_start_hour: u32,
}

impl Default for ShiftWindow {
    fn default() -> Self {
        Self {
            day_start_hour: 6,
            night_start_hour: 18,
        }
    }
}

impl ShiftWindow {
    pub fn is_day_hour(&self, hour: u32) -> bool {
        hour >= self.day_start_hour && hour < self.night_start_hour
    }
}

/// 品质分类码表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductClassification {
    pub prime_types: BTreeSet<String>,
    pub scrap_types: BTreeSet<String>,
}

impl Default for ProductClassification {
    fn default() -> Self {
        let to_set = |codes: &[&str]| codes.iter().map(|c| c.to_string()).collect();
        Self {
            prime_types: to_set(&["HL", "HM", "98", "71", "72", "74", "75", "76", "77", "70"]),
            scrap_types: to_set(&["HX", "HY", "HZ", "HC", "HH", "HR"]),
        }
    }
}

impl ProductClassification {
    pub fn is_prime(&self, type_code: Option<&str>) -> bool {
        type_code.map_or(false, |c| self.prime_types.contains(c))
    }

    pub fn is_scrap(&self, type_code: Option<&str>) -> bool {
        type_code.map_or(false, |c| self.scrap_types.contains(c))
    }
}

// ==========================================
// PipelineConfig - 流水线配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub production_file: PathBuf,
    pub maintenance_file: PathBuf,
    pub output_dir: PathBuf,
    /// None = 不做日期过滤
    pub date_window: Option<DateWindow>,
    /// None = 非确定性随机源
    pub seed: Option<u64>,
    pub timestamp_format: String,
    pub crew_codes: Vec<String>,
    pub shift: ShiftWindow,
    pub policy: GapPolicy,
    pub product: ProductClassification,
    pub line: LineProfile,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            production_file: PathBuf::from("coil_production_mar_september_2024.csv"),
            maintenance_file: PathBuf::from("maintenance_downtime_jan_oct_2024.csv"),
            output_dir: PathBuf::from("output_tables"),
            date_window: Some(DateWindow::default()),
            seed: None,
            timestamp_format: "%m/%d/%y %H:%M".to_string(),
            crew_codes: ["A", "B", "C", "D"].iter().map(|c| c.to_string()).collect(),
            shift: ShiftWindow::default(),
            policy: GapPolicy::default(),
            product: ProductClassification::default(),
            line: LineProfile::default(),
        }
    }
}

impl PipelineConfig {
    /// 从 JSON 文件加载配置（缺省字段取默认值）并校验
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let raw = fs::read_to_string(path)?;
        let config: PipelineConfig =
            serde_json::from_str(&raw).map_err(|e| ImportError::ConfigReadError {
                key: path.display().to_string(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置自洽性
    pub fn validate(&self) -> ImportResult<()> {
        if let Some(window) = &self.date_window {
            if window.start > window.end {
                return Err(ImportError::ConfigValueError {
                    key: config_keys::DATE_WINDOW.to_string(),
                    value: format!("{} .. {}", window.start, window.end),
                    message: "起始时间晚于结束时间".to_string(),
                });
            }
        }

        if self.crew_codes.is_empty() || self.crew_codes.iter().any(|c| c.trim().is_empty()) {
            return Err(ImportError::ConfigValueError {
                key: config_keys::CREW_CODES.to_string(),
                value: format!("{:?}", self.crew_codes),
                message: "班组代码不能为空".to_string(),
            });
        }

        if self.shift.day_start_hour >= self.shift.night_start_hour
            || self.shift.night_start_hour > 24
        {
            return Err(ImportError::ConfigValueError {
                key: config_keys::SHIFT.to_string(),
                value: format!("{:?}", self.shift),
                message: "白班区间必须满足 day_start < night_start <= 24".to_string(),
            });
        }

        let policy = &self.policy;
        if policy.idle_gap_threshold_sec < 0.0
            || policy.completion_gap_cap_min < 0.0
            || policy.parent_gap_cap_min < 0.0
        {
            return Err(ImportError::ConfigValueError {
                key: config_keys::POLICY.to_string(),
                value: format!("{:?}", policy),
                message: "阈值不能为负".to_string(),
            });
        }

        if self.timestamp_format.trim().is_empty() {
            return Err(ImportError::ConfigValueError {
                key: config_keys::TIMESTAMP_FORMAT.to_string(),
                value: self.timestamp_format.clone(),
                message: "时间格式不能为空".to_string(),
            });
        }

        self.line
            .validate()
            .map_err(|message| ImportError::ConfigValueError {
                key: config_keys::LINE.to_string(),
                value: "<line profile>".to_string(),
                message,
            })
    }

    /// 导出用配置快照（JSON）
    pub fn snapshot_json(&self) -> ImportResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ImportError::InternalError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.policy.idle_gap_threshold_sec, 30.0);
        assert_eq!(config.policy.completion_gap_cap_min, 360.0);
        assert_eq!(config.policy.parent_gap_cap_min, 30.0);
    }

    #[test]
    fn test_date_window_is_inclusive() {
        let window = DateWindow::default();
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.end + chrono::Duration::minutes(1)));
    }

    #[test]
    fn test_shift_window_boundaries() {
        let shift = ShiftWindow::default();
        assert!(!shift.is_day_hour(5));
        assert!(shift.is_day_hour(6));
        assert!(shift.is_day_hour(17));
        assert!(!shift.is_day_hour(18));
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"seed": 7, "date_window": null, "policy": {{"idle_gap_threshold_sec": 45.0}}}}"#
        )
        .unwrap();

        let config = PipelineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(config.date_window.is_none());
        assert_eq!(config.policy.idle_gap_threshold_sec, 45.0);
        assert_eq!(config.policy.parent_gap_cap_min, 30.0);
        assert_eq!(config.crew_codes.len(), 4);
    }

    #[test]
    fn test_validate_rejects_empty_crews() {
        let config = PipelineConfig {
            crew_codes: vec![],
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ImportError::ConfigValueError { .. })
        ));
    }

    #[test]
    fn test_product_classification() {
        let product = ProductClassification::default();
        assert!(product.is_prime(Some("HL")));
        assert!(product.is_scrap(Some("HX")));
        assert!(!product.is_prime(Some("HX")));
        assert!(!product.is_prime(None));
    }
}
