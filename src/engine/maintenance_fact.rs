// ==========================================
// 精整线时序合成 - 检修事实构建
// ==========================================
// 职责: 检修中间记录 → MaintenanceEvent
// 口径: 开始时间或时长缺失的行丢弃并计数; duration_min = 小时 × 60
// ==========================================

use crate::domain::maintenance::{MaintenanceEvent, RawMaintenanceRecord};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct MaintenanceFactBuild {
    pub events: Vec<MaintenanceEvent>,
    pub dropped_missing_start: usize,
    pub dropped_missing_duration: usize,
}

pub struct MaintenanceFactBuilder;

impl MaintenanceFactBuilder {
    pub fn build(&self, records: Vec<RawMaintenanceRecord>) -> MaintenanceFactBuild {
        let mut result = MaintenanceFactBuild::default();

        for record in records {
            let Some(start_datetime) = record.start_datetime else {
                result.dropped_missing_start += 1;
                debug!(row = record.row_number, "检修行缺少开始时间");
                continue;
            };
            let Some(duration_hours) = record.duration_hours else {
                result.dropped_missing_duration += 1;
                debug!(row = record.row_number, "检修行缺少时长");
                continue;
            };

            result.events.push(MaintenanceEvent {
                start_datetime,
                duration_hours,
                duration_min: duration_hours * 60.0,
                equipment_name: record.equipment_name,
                crew: record.crew,
                shifts: record.shifts,
                category: record.category,
                delay_type: record.delay_type,
                area: record.area,
                sub_area: record.sub_area,
                hierarchy: record.hierarchy,
                description: record.description,
                day: record.day,
                reasponsible: record.reasponsible,
                responsible: record.responsible,
            });
        }

        info!(
            events = result.events.len(),
            dropped_missing_start = result.dropped_missing_start,
            dropped_missing_duration = result.dropped_missing_duration,
            "检修事实构建完成"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_build_drops_incomplete_rows() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let records = vec![
            RawMaintenanceRecord {
                start_datetime: Some(start),
                duration_hours: Some(1.5),
                equipment_name: Some("Decoiler".to_string()),
                ..Default::default()
            },
            RawMaintenanceRecord {
                start_datetime: None,
                duration_hours: Some(1.0),
                ..Default::default()
            },
            RawMaintenanceRecord {
                start_datetime: Some(start),
                duration_hours: None,
                ..Default::default()
            },
        ];

        let build = MaintenanceFactBuilder.build(records);
        assert_eq!(build.events.len(), 1);
        assert_eq!(build.events[0].duration_min, 90.0);
        assert_eq!(build.dropped_missing_start, 1);
        assert_eq!(build.dropped_missing_duration, 1);
    }
}
