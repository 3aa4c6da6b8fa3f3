// ==========================================
// 精整线时序合成 - 设备拓扑构建
// ==========================================
// 职责: 由检修记录的设备名构建 dim_equipment, 并给出产线遍历顺序
// 口径:
// - 设备名去重后排序, 编号 1..n 按排序枚举
// - 名称含排除关键字（大小写不敏感）的不入维度表
// - 工序号/瓶颈来自配置档; 区段由工序号派生; 类型按名称模式匹配
// ==========================================

use crate::config::LineProfile;
use crate::domain::equipment::Equipment;
use crate::domain::types::Section;
use crate::engine::error::{EngineError, EngineResult};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

// 类型匹配顺序有意义: "Exit Coil Car" 先命中 Coil Car, "Temper Mill Unit" 命中 Mill
const TYPE_PATTERNS: &[(&[&str], &str)] = &[
    (&["COIL CAR"], "Coil Car"),
    (&["DECOILER"], "Decoiler"),
    (&["RECOILER"], "Recoiler"),
    (&["SHEAR"], "Shear"),
    (&["MILL"], "Mill"),
    (&["CONVEYOR", "SCALE"], "Conveyor/Transfer"),
    (&["STRAPPING"], "Strapping"),
    (&["FLATTENER", "PINCH", "ROLL"], "Roll Equipment"),
    (&["GUIDE", "TABLE", "FEED"], "Guide/Support"),
];

const OTHER_TYPE: &str = "Other";

/// 按名称模式推断设备类型
pub fn classify_equipment_type(name: &str) -> &'static str {
    let upper = name.to_uppercase();
    TYPE_PATTERNS
        .iter()
        .find(|(patterns, _)| patterns.iter().any(|p| upper.contains(p)))
        .map(|(_, label)| *label)
        .unwrap_or(OTHER_TYPE)
}

/// 由工序号派生区段
pub fn assign_section(process_order: Option<u32>, profile: &LineProfile) -> Option<Section> {
    let order = process_order?;
    if order <= profile.entry_section_max_order {
        Some(Section::Entry)
    } else if order <= profile.centre_section_max_order {
        Some(Section::Centre)
    } else {
        Some(Section::Exit)
    }
}

// ==========================================
// LineTopology - 设备维度 + 产线顺序
// ==========================================
#[derive(Debug, Clone)]
pub struct LineTopology {
    equipment: Vec<Equipment>,
    excluded_names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl LineTopology {
    /// 由清洗后的设备名构建拓扑
    pub fn build<'a, I>(names: I, profile: &LineProfile) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unique: BTreeSet<String> = names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        let keywords: Vec<String> = profile
            .exclusion_keywords
            .iter()
            .map(|k| k.to_uppercase())
            .collect();

        let (excluded_names, kept): (Vec<String>, Vec<String>) = unique.into_iter().partition(|name| {
            let upper = name.to_uppercase();
            keywords.iter().any(|k| upper.contains(k.as_str()))
        });

        let equipment: Vec<Equipment> = kept
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let process_order = profile.process_order.get(&name).copied();
                Equipment {
                    equipment_id: idx as u32 + 1,
                    process_order,
                    section: assign_section(process_order, profile),
                    equipment_type: classify_equipment_type(&name).to_string(),
                    is_bottleneck_candidate: profile.bottlenecks.contains(&name),
                    is_active: !profile.non_line.contains(&name),
                    equipment_name: name,
                }
            })
            .collect();

        let by_name = equipment
            .iter()
            .enumerate()
            .map(|(idx, e)| (e.equipment_name.clone(), idx))
            .collect();

        for name in &excluded_names {
            debug!(equipment = %name, "排除非产线设备");
        }

        let topology = Self {
            equipment,
            excluded_names,
            by_name,
        };

        info!(
            total = topology.equipment.len(),
            excluded = topology.excluded_names.len(),
            line = topology.line_equipment().len(),
            bottlenecks = topology
                .line_equipment()
                .iter()
                .filter(|e| e.is_bottleneck_candidate)
                .count(),
            "设备维度构建完成"
        );

        topology
    }

    /// 完整维度表（按 equipment_id）
    pub fn dimension(&self) -> &[Equipment] {
        &self.equipment
    }

    pub fn excluded_names(&self) -> &[String] {
        &self.excluded_names
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Equipment> {
        self.by_name.get(name).map(|idx| &self.equipment[*idx])
    }

    /// 产线设备: 启用且有工序号, 按工序号升序
    pub fn line_equipment(&self) -> Vec<&Equipment> {
        let mut line: Vec<&Equipment> = self
            .equipment
            .iter()
            .filter(|e| e.is_line_equipment())
            .collect();
        line.sort_by_key(|e| e.process_order);
        line
    }

    /// 产线设备（为空时报错）
    pub fn require_line(&self) -> EngineResult<Vec<&Equipment>> {
        let line = self.line_equipment();
        if line.is_empty() {
            return Err(EngineError::EmptyLine);
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<&'static str> {
        vec![
            "Recoiler",
            "Decoiler",
            "Cranes",
            "Computer Room",
            "Lube System",
            "Temper Mill Unit",
            "Decoiler",
            "Scale M65 (conveyor)",
            "Operations",
        ]
    }

    #[test]
    fn test_ids_follow_sorted_names_after_exclusion() {
        let topology = LineTopology::build(names(), &LineProfile::default());
        let dim = topology.dimension();

        let listed: Vec<(&str, u32)> = dim
            .iter()
            .map(|e| (e.equipment_name.as_str(), e.equipment_id))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("Decoiler", 1),
                ("Lube System", 2),
                ("Recoiler", 3),
                ("Scale M65 (conveyor)", 4),
                ("Temper Mill Unit", 5),
            ]
        );
        assert_eq!(
            topology.excluded_names(),
            &["Computer Room".to_string(), "Cranes".to_string(), "Operations".to_string()]
        );
    }

    #[test]
    fn test_attributes_and_line_order() {
        let topology = LineTopology::build(names(), &LineProfile::default());

        let lube = topology.find_by_name("Lube System").unwrap();
        assert!(!lube.is_active);
        assert_eq!(lube.process_order, None);
        assert_eq!(lube.section, None);

        let scale = topology.find_by_name("Scale M65 (conveyor)").unwrap();
        assert_eq!(scale.section, Some(Section::Exit));
        assert_eq!(scale.equipment_type, "Conveyor/Transfer");
        assert!(scale.is_bottleneck_candidate);

        let line: Vec<&str> = topology
            .line_equipment()
            .iter()
            .map(|e| e.equipment_name.as_str())
            .collect();
        assert_eq!(
            line,
            vec!["Decoiler", "Temper Mill Unit", "Recoiler", "Scale M65 (conveyor)"]
        );
    }

    #[test]
    fn test_equipment_type_patterns() {
        assert_eq!(classify_equipment_type("Exit Coil Car"), "Coil Car");
        assert_eq!(classify_equipment_type("Temper Mill Unit"), "Mill");
        assert_eq!(classify_equipment_type("Crop Shear"), "Shear");
        assert_eq!(
            classify_equipment_type("Flattener, Pinch & Deflator Rolls"),
            "Roll Equipment"
        );
        assert_eq!(classify_equipment_type("Entry Guide Table"), "Guide/Support");
        assert_eq!(classify_equipment_type("Coil Prep Sattion"), "Other");
    }

    #[test]
    fn test_section_boundaries() {
        let profile = LineProfile::default();
        assert_eq!(assign_section(Some(6), &profile), Some(Section::Entry));
        assert_eq!(assign_section(Some(7), &profile), Some(Section::Centre));
        assert_eq!(assign_section(Some(11), &profile), Some(Section::Centre));
        assert_eq!(assign_section(Some(12), &profile), Some(Section::Exit));
        assert_eq!(assign_section(None, &profile), None);
    }

    #[test]
    fn test_empty_line_is_error() {
        let topology = LineTopology::build(vec!["Lube System"], &LineProfile::default());
        assert!(matches!(topology.require_line(), Err(EngineError::EmptyLine)));
    }
}
