// ==========================================
// 精整线时序合成 - 设备事件日志
// ==========================================
// 对齐: fact_equipment_event_log 导出表
// ==========================================

use crate::domain::types::EventType;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// IDLE/FAULT 事件不携带卷号与品质信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentEvent {
    pub equipment_id: u32,
    pub equipment_name: String,
    pub event_type: EventType,
    pub event_start_ts: NaiveDateTime,
    pub event_end_ts: NaiveDateTime,
    pub event_duration_sec: f64,
    pub coil_id: Option<String>,
    pub parent_coil_id: Option<String>,
    pub shift_code: Option<String>,
    pub type_code: Option<String>,
    pub is_prime: bool,
    pub is_scrap: bool,
    pub event_date: NaiveDate,
}
