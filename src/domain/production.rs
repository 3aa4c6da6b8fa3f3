// ==========================================
// 精整线时序合成 - 生产卷领域模型
// ==========================================
// 对齐: fact_production_coil 导出表
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// RawProductionRecord - 导入中间结构体
// ==========================================
// 用途: 文件解析 → 字段映射 → 此结构
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProductionRecord {
    pub coil_id: Option<String>,             // UID（分卷号）
    pub parent_coil_id: Option<String>,      // CID（母卷号）
    pub completion_ts: Option<NaiveDateTime>, // MES 完工时间（解析失败为 None）
    pub thickness_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub mass_out_tons: Option<f64>,
    pub hours: Option<String>,
    pub grade: Option<String>,
    pub next_process: Option<String>,
    pub type_code: Option<String>,           // 已 TRIM + UPPER
    pub cast: Option<String>,
    pub slab: Option<String>,

    // 元信息
    pub row_number: usize,
}

// ==========================================
// ProductionCoil - 生产卷事实
// ==========================================
// 红线: completion_ts 为唯一真值, 合成时间只能由它反推
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionCoil {
    // ===== 主键 =====
    pub coil_id: String,
    pub parent_coil_id: String,

    // ===== 时间 =====
    pub production_date: Option<NaiveDate>,
    pub completion_ts: Option<NaiveDateTime>,
    pub shift_code: Option<String>,          // 合成阶段派生

    // ===== 规格 =====
    pub thickness_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub mass_out_tons: Option<f64>,

    // ===== 透传字段 =====
    pub hours: Option<String>,
    pub grade: Option<String>,
    pub next_process: Option<String>,

    // ===== 品质分类 =====
    pub type_code: Option<String>,
    pub is_prime: bool,
    pub is_scrap: bool,

    // ===== 节奏指标（分钟）=====
    pub gap_from_prev_completion_min: Option<f64>,
    pub gap_from_prev_parent_min: Option<f64>,

    pub cast: Option<String>,
    pub slab: Option<String>,

    // ===== 合成时间（锚定完工时间）=====
    pub start_datetime: Option<NaiveDateTime>,
    pub end_datetime: Option<NaiveDateTime>,
    pub total_cycle_time_min: Option<f64>,
}
