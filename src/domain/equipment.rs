// ==========================================
// 精整线时序合成 - 设备维度
// ==========================================
// 对齐: dim_equipment 导出表
// ==========================================

use crate::domain::types::Section;
use serde::{Deserialize, Serialize};

// ==========================================
// Equipment - 设备维度记录
// ==========================================
// 用途: 拓扑构建写入, 合成/事件层只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub equipment_id: u32,              // 按名称排序枚举的稳定编号（从 1 开始）
    pub equipment_name: String,         // 清洗后的子区域名称（唯一）
    pub process_order: Option<u32>,     // 工序号（None = 不在建模产线上）
    pub section: Option<Section>,       // 区段（由工序号派生）
    pub equipment_type: String,         // 设备类型（名称模式匹配）
    pub is_bottleneck_candidate: bool,  // 瓶颈候选
    pub is_active: bool,                // 是否产线设备（公辅设备为 false）
}

impl Equipment {
    /// 是否参与卷材工序遍历
    pub fn is_line_equipment(&self) -> bool {
        self.is_active && self.process_order.is_some()
    }
}
