// ==========================================
// 精整线时序合成 - 班组轮值
// ==========================================
// 对齐: dim_date_crew_schedule 导出表
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewAssignment {
    pub production_date: NaiveDate,
    pub day_crew: String,
    pub night_crew: String,
}
