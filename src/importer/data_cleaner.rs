// ==========================================
// 精整线时序合成 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 时间戳与时长解析 / 子区域清洗
// 口径: 解析失败一律返回 None, 不中断导入
// ==========================================

use chrono::NaiveDateTime;

pub struct DataCleaner;

impl DataCleaner {
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    /// 空字符串/空白/NaN 占位 → None
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 按配置格式解析时间戳（默认 %m/%d/%y %H:%M）
    pub fn parse_timestamp(&self, value: Option<&str>, format: &str) -> Option<NaiveDateTime> {
        let v = self.normalize_null(value)?;
        NaiveDateTime::parse_from_str(&v, format).ok()
    }

    /// 宽松浮点解析（允许千分位逗号）
    pub fn parse_f64(&self, value: Option<&str>) -> Option<f64> {
        let v = self.normalize_null(value)?;
        v.replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
    }

    /// 时长串解析为小时
    ///
    /// # 支持格式
    /// - `HH:MM:SS` / `H:MM:SS.fff`
    /// - `HH:MM`
    /// - `N days HH:MM:SS`（或 `N day`）
    ///
    /// 负数或无法解析 → None
    pub fn parse_duration_span_hours(&self, value: Option<&str>) -> Option<f64> {
        let v = self.normalize_null(value)?;

        let (days, clock) = match v.split_once("day") {
            Some((d, rest)) => {
                let days: f64 = d.trim().parse().ok()?;
                let rest = rest.trim_start_matches('s').trim().trim_start_matches(',').trim();
                (days, rest.to_string())
            }
            None => (0.0, v),
        };

        let parts: Vec<&str> = clock.split(':').collect();
        let (h, m, s) = match parts.as_slice() {
            [h, m, s] => (*h, *m, *s),
            [h, m] => (*h, *m, "0"),
            [""] if days > 0.0 => ("0", "0", "0"),
            _ => return None,
        };

        let hours: f64 = h.trim().parse().ok()?;
        let minutes: f64 = m.trim().parse().ok()?;
        let seconds: f64 = s.trim().parse().ok()?;

        if hours < 0.0 || !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
            return None;
        }

        let total = days * 24.0 + hours + minutes / 60.0 + seconds / 3600.0;
        if total.is_finite() && total >= 0.0 {
            Some(total)
        } else {
            None
        }
    }

    /// 非负小时数（负值视为无法解析）
    pub fn parse_hours(&self, value: Option<&str>) -> Option<f64> {
        self.parse_f64(value).filter(|h| *h >= 0.0)
    }

    /// 子区域清洗: TRIM → 去掉一个尾部 "(数字)" → TRIM
    ///
    /// # 示例
    /// - "Decoiler(2)" → "Decoiler"
    /// - "Scale M65 (conveyor)" → 不变（括号内非数字）
    pub fn clean_sub_area(&self, value: Option<&str>) -> Option<String> {
        let v = self.normalize_null(value)?;
        let cleaned = strip_trailing_numeric_suffix(&v).trim().to_string();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }
}

fn strip_trailing_numeric_suffix(value: &str) -> &str {
    let Some(body) = value.strip_suffix(')') else {
        return value;
    };
    let Some(open) = body.rfind('(') else {
        return value;
    };
    let digits = &body[open + 1..];
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        &value[..open]
    } else {
        value
    }
}
