// ==========================================
// 精整线时序合成 - 卷材工序事实
// ==========================================
// 对齐: fact_coil_operation_cycle 导出表
// 不变量: 同一卷内首尾相接, 末工序结束 == completion_ts
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoilOperation {
    pub coil_id: String,
    pub parent_coil_id: String,
    pub equipment_id: u32,
    pub equipment_name: String,
    pub production_date: Option<NaiveDate>,
    pub shift_code: String,
    pub operation_start_ts: NaiveDateTime,
    pub operation_end_ts: NaiveDateTime,
    pub operation_duration_sec: f64,
    pub queue_time_sec: f64, // 卷内排队不建模, 卷间等待体现在完工间隔
    pub is_bottleneck_step: bool,
    pub type_code: Option<String>,
    pub is_prime: bool,
    pub is_scrap: bool,
}
