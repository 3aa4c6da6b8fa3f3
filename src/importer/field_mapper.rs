// ==========================================
// 精整线时序合成 - 字段映射器实现
// ==========================================
// 职责: MES 源列 → 标准字段映射 + 类型转换
// 红线: 必需列缺失为致命错误; 单元格解析失败只置空
// ==========================================

use crate::domain::maintenance::RawMaintenanceRecord;
use crate::domain::production::RawProductionRecord;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawTable;
use std::collections::HashMap;

// ==========================================
// 源列名
// ==========================================
pub mod production_columns {
    pub const TABLE: &str = "production";
    pub const UID: &str = "UID";
    pub const CID: &str = "CID";
    pub const PRODUCTION_DATE: &str = "Production Date";
    pub const THICKNESS_PRIMARY: &str = "Thickess";
    pub const THICKNESS_ALTERNATE: &str = "Thick";
    pub const WIDTH: &str = "Width";
    pub const MASS_OUT: &str = "Mass out tons";
    pub const TYPE: &str = "Type";
    pub const HOURS: &str = "Hours";
    pub const GRADE: &str = "Grade";
    pub const NEXT_PROCESS: &str = "NextProcess";
    pub const CAST: &str = "Cast";
    pub const SLAB: &str = "Slab";

    pub const REQUIRED: [&str; 5] = [UID, CID, PRODUCTION_DATE, WIDTH, MASS_OUT];
}

pub mod maintenance_columns {
    pub const TABLE: &str = "maintenance";
    pub const START: &str = "Start";
    pub const SUB_AREA: &str = "Sub Area";
    pub const TIME_HOURS: &str = "Time (Hours)";
    pub const DURATION: &str = "Duration";
    pub const CREW: &str = "Crew";
    pub const SHIFTS: &str = "Shifts";
    pub const CATEGORY: &str = "Category";
    pub const DELAY_TYPE: &str = "Delay Type";
    pub const AREA: &str = "Area";
    pub const HIERARCHY: &str = "Hierachy";
    pub const DESCRIPTION: &str = "Decription";
    pub const DAY: &str = "Day";
    pub const REASPONSIBLE: &str = "Reasponsible";
    pub const RESPONSIBLE: &str = "Responsible";

    pub const REQUIRED: [&str; 2] = [START, SUB_AREA];
}

/// 生产表列解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionColumnPlan {
    pub thickness_column: &'static str,
    pub has_type_column: bool,
}

/// 检修表列解析结果（两种时长口径至少存在一种）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceColumnPlan {
    pub has_hours_column: bool,
    pub has_span_column: bool,
}

fn require_columns(table: &RawTable, name: &str, required: &[&str]) -> ImportResult<()> {
    for column in required {
        if !table.has_column(column) {
            return Err(ImportError::MissingColumn {
                table: name.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
pub struct FieldMapper {
    cleaner: DataCleaner,
    timestamp_format: String,
}

impl FieldMapper {
    pub fn new(timestamp_format: &str) -> Self {
        Self {
            cleaner: DataCleaner,
            timestamp_format: timestamp_format.to_string(),
        }
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    pub fn cleaner(&self) -> &DataCleaner {
        &self.cleaner
    }

    // ==========================================
    // 生产表
    // ==========================================

    /// 解析生产表列布局
    ///
    /// # 厚度列规则
    /// 1. "Thickess" 存在且至少一行非空 → 使用
    /// 2. 否则 "Thick" 存在 → 使用
    /// 3. 否则致命错误
    pub fn plan_production(&self, table: &RawTable) -> ImportResult<ProductionColumnPlan> {
        use production_columns as pc;

        require_columns(table, pc::TABLE, &pc::REQUIRED)?;

        let thickness_column = if table.has_values(pc::THICKNESS_PRIMARY) {
            pc::THICKNESS_PRIMARY
        } else if table.has_column(pc::THICKNESS_ALTERNATE) {
            pc::THICKNESS_ALTERNATE
        } else {
            return Err(ImportError::MissingColumn {
                table: pc::TABLE.to_string(),
                column: format!("{} / {}", pc::THICKNESS_PRIMARY, pc::THICKNESS_ALTERNATE),
            });
        };

        Ok(ProductionColumnPlan {
            thickness_column,
            has_type_column: table.has_column(pc::TYPE),
        })
    }

    pub fn map_production(
        &self,
        row: &HashMap<String, String>,
        plan: &ProductionColumnPlan,
        row_number: usize,
    ) -> RawProductionRecord {
        use production_columns as pc;
        let get = |key: &str| row.get(key).map(String::as_str);

        let type_code = if plan.has_type_column {
            self.cleaner
                .normalize_null(get(pc::TYPE))
                .map(|v| self.cleaner.clean_text(&v, true))
        } else {
            None
        };

        RawProductionRecord {
            coil_id: self.cleaner.normalize_null(get(pc::UID)),
            parent_coil_id: self.cleaner.normalize_null(get(pc::CID)),
            completion_ts: self
                .cleaner
                .parse_timestamp(get(pc::PRODUCTION_DATE), &self.timestamp_format),
            thickness_mm: self.cleaner.parse_f64(get(plan.thickness_column)),
            width_mm: self.cleaner.parse_f64(get(pc::WIDTH)),
            mass_out_tons: self.cleaner.parse_f64(get(pc::MASS_OUT)),
            hours: self.cleaner.normalize_null(get(pc::HOURS)),
            grade: self.cleaner.normalize_null(get(pc::GRADE)),
            next_process: self.cleaner.normalize_null(get(pc::NEXT_PROCESS)),
            type_code,
            cast: self.cleaner.normalize_null(get(pc::CAST)),
            slab: self.cleaner.normalize_null(get(pc::SLAB)),
            row_number,
        }
    }

    // ==========================================
    // 检修表
    // ==========================================

    pub fn plan_maintenance(&self, table: &RawTable) -> ImportResult<MaintenanceColumnPlan> {
        use maintenance_columns as mc;

        require_columns(table, mc::TABLE, &mc::REQUIRED)?;

        let plan = MaintenanceColumnPlan {
            has_hours_column: table.has_column(mc::TIME_HOURS),
            has_span_column: table.has_column(mc::DURATION),
        };

        if !plan.has_hours_column && !plan.has_span_column {
            return Err(ImportError::MissingColumn {
                table: mc::TABLE.to_string(),
                column: format!("{} / {}", mc::TIME_HOURS, mc::DURATION),
            });
        }

        Ok(plan)
    }

    /// 映射检修行
    ///
    /// # 时长口径
    /// - 小时列存在且本行可解析 → 使用小时列
    /// - 否则时长串列（HH:MM:SS）换算为小时
    pub fn map_maintenance(
        &self,
        row: &HashMap<String, String>,
        plan: &MaintenanceColumnPlan,
        row_number: usize,
    ) -> RawMaintenanceRecord {
        use maintenance_columns as mc;
        let get = |key: &str| row.get(key).map(String::as_str);

        let from_hours = if plan.has_hours_column {
            self.cleaner.parse_hours(get(mc::TIME_HOURS))
        } else {
            None
        };
        let duration_hours = from_hours.or_else(|| {
            if plan.has_span_column {
                self.cleaner.parse_duration_span_hours(get(mc::DURATION))
            } else {
                None
            }
        });

        RawMaintenanceRecord {
            start_datetime: self
                .cleaner
                .parse_timestamp(get(mc::START), &self.timestamp_format),
            duration_hours,
            sub_area: self.cleaner.normalize_null(get(mc::SUB_AREA)),
            equipment_name: self.cleaner.clean_sub_area(get(mc::SUB_AREA)),
            crew: self.cleaner.normalize_null(get(mc::CREW)),
            shifts: self.cleaner.normalize_null(get(mc::SHIFTS)),
            category: self.cleaner.normalize_null(get(mc::CATEGORY)),
            delay_type: self.cleaner.normalize_null(get(mc::DELAY_TYPE)),
            area: self.cleaner.normalize_null(get(mc::AREA)),
            hierarchy: self.cleaner.normalize_null(get(mc::HIERARCHY)),
            description: self.cleaner.normalize_null(get(mc::DESCRIPTION)),
            day: self.cleaner.normalize_null(get(mc::DAY)),
            reasponsible: self.cleaner.normalize_null(get(mc::REASPONSIBLE)),
            responsible: self.cleaner.normalize_null(get(mc::RESPONSIBLE)),
            row_number,
        }
    }
}
