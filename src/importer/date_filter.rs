// ==========================================
// 精整线时序合成 - 日期窗口过滤
// ==========================================
// 职责: 按时间戳列裁剪原始表
// 口径: 窗口两端包含; 时间戳无法解析的行不能通过启用的窗口
// ==========================================

use crate::config::DateWindow;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::file_parser::RawTable;
use serde::{Deserialize, Serialize};

/// 过滤统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub unparseable_rows: usize,
    pub out_of_window_rows: usize,
}

pub struct DateWindowFilter<'a> {
    cleaner: &'a DataCleaner,
    timestamp_format: &'a str,
    window: Option<DateWindow>,
}

impl<'a> DateWindowFilter<'a> {
    pub fn new(cleaner: &'a DataCleaner, timestamp_format: &'a str, window: Option<DateWindow>) -> Self {
        Self {
            cleaner,
            timestamp_format,
            window,
        }
    }

    /// 过滤原始表（窗口为 None 时全部保留）
    pub fn apply(&self, table: RawTable, column: &str) -> (RawTable, FilterSummary) {
        let mut summary = FilterSummary {
            total_rows: table.len(),
            ..FilterSummary::default()
        };

        let Some(window) = self.window else {
            summary.kept_rows = table.len();
            return (table, summary);
        };

        let RawTable { headers, rows } = table;
        let mut kept = Vec::with_capacity(rows.len());

        for row in rows {
            let ts = self
                .cleaner
                .parse_timestamp(row.get(column).map(String::as_str), self.timestamp_format);
            match ts {
                None => summary.unparseable_rows += 1,
                Some(ts) if window.contains(ts) => kept.push(row),
                Some(_) => summary.out_of_window_rows += 1,
            }
        }

        summary.kept_rows = kept.len();
        (RawTable { headers, rows: kept }, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn table(dates: &[&str]) -> RawTable {
        RawTable {
            headers: vec!["Start".to_string()],
            rows: dates
                .iter()
                .map(|d| HashMap::from([("Start".to_string(), d.to_string())]))
                .collect(),
        }
    }

    #[test]
    fn test_window_filter_counts() {
        let cleaner = DataCleaner;
        let filter = DateWindowFilter::new(&cleaner, "%m/%d/%y %H:%M", Some(DateWindow::default()));
        let (kept, summary) = filter.apply(
            table(&[
                "3/31/24 23:59",
                "4/1/24 00:00",
                "8/31/24 00:00",
                "8/31/24 00:01",
                "garbage",
            ]),
            "Start",
        );

        assert_eq!(kept.len(), 2);
        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.kept_rows, 2);
        assert_eq!(summary.out_of_window_rows, 2);
        assert_eq!(summary.unparseable_rows, 1);
    }

    #[test]
    fn test_disabled_window_keeps_everything() {
        let cleaner = DataCleaner;
        let filter = DateWindowFilter::new(&cleaner, "%m/%d/%y %H:%M", None);
        let (kept, summary) = filter.apply(table(&["garbage", "1/1/20 00:00"]), "Start");
        assert_eq!(kept.len(), 2);
        assert_eq!(summary.kept_rows, 2);
    }
}
