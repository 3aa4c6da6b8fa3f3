// ==========================================
// 精整线时序合成 - 领域类型定义
// ==========================================
// 职责: 产线区段 / 事件类型 / 产品规格带
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 产线区段 (Section)
// ==========================================
// 由工序号派生: <=6 入口, <=11 中段, 其余出口
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Section {
    Entry,  // 入口段
    Centre, // 中段
    Exit,   // 出口段
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Entry => write!(f, "ENTRY"),
            Section::Centre => write!(f, "CENTRE"),
            Section::Exit => write!(f, "EXIT"),
        }
    }
}

// ==========================================
// 设备事件类型 (Event Type)
// ==========================================
// RUN/IDLE 来自合成工序, FAULT 来自检修记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Run,
    Idle,
    Fault,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Run => write!(f, "RUN"),
            EventType::Idle => write!(f, "IDLE"),
            EventType::Fault => write!(f, "FAULT"),
        }
    }
}

// ==========================================
// 产品规格带 (Product Band)
// ==========================================
// 厚度+宽度组合决定节奏系数区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductBand {
    ThinNarrow, // 薄且窄: 快
    ThickWide,  // 厚且宽: 慢
    Baseline,   // 其余组合(含死区)
    Unknown,    // 厚度或宽度缺失
}

impl fmt::Display for ProductBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductBand::ThinNarrow => write!(f, "THIN_NARROW"),
            ProductBand::ThickWide => write!(f, "THICK_WIDE"),
            ProductBand::Baseline => write!(f, "BASELINE"),
            ProductBand::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
