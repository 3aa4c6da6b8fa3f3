// ==========================================
// 精整线时序合成 - 班组轮转
// ==========================================
// 职责: 为每个生产日分配白班/夜班班组, 并据完工时刻派生班组代码
// 规则: 生产日按升序编号 i, 白班 = codes[i % n], 夜班 = codes[(i+1) % n]
// 说明: 轮转仅依赖生产日集合, 与随机源无关
// ==========================================

use crate::config::ShiftWindow;
use crate::domain::crew::CrewAssignment;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct CrewSchedule {
    by_date: BTreeMap<NaiveDate, (String, String)>,
    fallback: (String, String),
}

impl CrewSchedule {
    /// 由生产日集合构建轮转表（crew_codes 不能为空, 由配置校验保证）
    pub fn build<I>(dates: I, crew_codes: &[String]) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let n = crew_codes.len().max(1);
        let code = |idx: usize| crew_codes.get(idx % n).cloned().unwrap_or_default();

        let unique: BTreeSet<NaiveDate> = dates.into_iter().collect();
        let by_date = unique
            .into_iter()
            .enumerate()
            .map(|(i, date)| (date, (code(i), code(i + 1))))
            .collect();

        Self {
            by_date,
            fallback: (code(0), code(1)),
        }
    }

    /// 生产日的 (白班, 夜班); 表外日期取首个轮转对
    pub fn crews_for(&self, date: NaiveDate) -> (&str, &str) {
        let (day, night) = self.by_date.get(&date).unwrap_or(&self.fallback);
        (day.as_str(), night.as_str())
    }

    /// 按完工时刻派生班组代码
    pub fn shift_code_for(&self, completion_ts: NaiveDateTime, window: &ShiftWindow) -> &str {
        let (day, night) = self.crews_for(completion_ts.date());
        if window.is_day_hour(completion_ts.hour()) {
            day
        } else {
            night
        }
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// 导出用轮转表
    pub fn assignments(&self) -> Vec<CrewAssignment> {
        self.by_date
            .iter()
            .map(|(date, (day, night))| CrewAssignment {
                production_date: *date,
                day_crew: day.clone(),
                night_crew: night.clone(),
            })
            .collect()
    }
}
