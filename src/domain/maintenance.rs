// ==========================================
// 精整线时序合成 - 检修停机领域模型
// ==========================================
// 对齐: fact_maintenance_event 导出表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// RawMaintenanceRecord - 导入中间结构体
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMaintenanceRecord {
    pub start_datetime: Option<NaiveDateTime>,
    pub duration_hours: Option<f64>,         // 小时列优先, 否则由时长串换算
    pub sub_area: Option<String>,            // 原始子区域
    pub equipment_name: Option<String>,      // 清洗后子区域（去掉尾部 "(数字)"）
    pub crew: Option<String>,
    pub shifts: Option<String>,
    pub category: Option<String>,
    pub delay_type: Option<String>,
    pub area: Option<String>,
    pub hierarchy: Option<String>,
    pub description: Option<String>,
    pub day: Option<String>,
    pub reasponsible: Option<String>,
    pub responsible: Option<String>,

    // 元信息
    pub row_number: usize,
}

// ==========================================
// MaintenanceEvent - 检修事件事实
// ==========================================
// 不变量: start_datetime 与 duration_hours 均非空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub start_datetime: NaiveDateTime,
    pub duration_hours: f64,
    pub duration_min: f64,
    pub equipment_name: Option<String>,
    pub crew: Option<String>,
    pub shifts: Option<String>,
    pub category: Option<String>,
    pub delay_type: Option<String>,
    pub area: Option<String>,
    pub sub_area: Option<String>,
    pub hierarchy: Option<String>,
    pub description: Option<String>,
    pub day: Option<String>,
    pub reasponsible: Option<String>,
    pub responsible: Option<String>,
}
