// ==========================================
// 精整线时序合成 - 设备事件日志
// ==========================================
// 职责: 由工序记录与检修事实生成 RUN / IDLE / FAULT 事件
// 口径:
// - RUN: 每条工序记录一条
// - IDLE: 同设备按开始时间排序, 相邻 RUN 间隔 > 阈值时插入
// - FAULT: 检修记录按清洗后设备名关联维度表（含非产线设备）, 未匹配跳过并计数
// - FAULT 与 RUN/IDLE 不做对齐, 重叠原样保留
// ==========================================

use crate::domain::equipment::Equipment;
use crate::domain::event::EquipmentEvent;
use crate::domain::maintenance::MaintenanceEvent;
use crate::domain::operation::CoilOperation;
use crate::domain::types::EventType;
use crate::engine::operation_synth::{micros_to_seconds, seconds_to_micros};
use chrono::Duration;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct EventLogBuild {
    pub events: Vec<EquipmentEvent>,
    pub run_events: usize,
    pub idle_events: usize,
    pub fault_events: usize,
    /// 设备名为空或不在维度表中的检修记录
    pub faults_unmatched: usize,
}

pub struct EventLogBuilder {
    idle_gap_threshold_sec: f64,
}

impl EventLogBuilder {
    pub fn new(idle_gap_threshold_sec: f64) -> Self {
        Self {
            idle_gap_threshold_sec,
        }
    }

    pub fn build(
        &self,
        operations: &[CoilOperation],
        maintenance: &[MaintenanceEvent],
        dimension: &[Equipment],
    ) -> EventLogBuild {
        let mut result = EventLogBuild::default();

        self.append_run_idle(operations, &mut result);
        self.append_faults(maintenance, dimension, &mut result);

        info!(
            run = result.run_events,
            idle = result.idle_events,
            fault = result.fault_events,
            fault_unmatched = result.faults_unmatched,
            "设备事件日志生成完成"
        );
        result
    }

    fn append_run_idle(&self, operations: &[CoilOperation], result: &mut EventLogBuild) {
        let threshold_us = seconds_to_micros(self.idle_gap_threshold_sec);

        let mut by_equipment: BTreeMap<u32, Vec<&CoilOperation>> = BTreeMap::new();
        for op in operations {
            by_equipment.entry(op.equipment_id).or_default().push(op);
        }

        for (equipment_id, mut ops) in by_equipment {
            ops.sort_by_key(|op| op.operation_start_ts);
            debug!(equipment_id, runs = ops.len(), "生成设备运行/空闲事件");

            let mut prev: Option<&CoilOperation> = None;
            for op in ops {
                if let Some(p) = prev {
                    let gap = op.operation_start_ts - p.operation_end_ts;
                    if gap.num_microseconds().map_or(false, |g| g > threshold_us) {
                        result.events.push(idle_event(p, op));
                        result.idle_events += 1;
                    }
                }

                result.events.push(run_event(op));
                result.run_events += 1;
                prev = Some(op);
            }
        }
    }

    fn append_faults(
        &self,
        maintenance: &[MaintenanceEvent],
        dimension: &[Equipment],
        result: &mut EventLogBuild,
    ) {
        let by_name: HashMap<&str, &Equipment> = dimension
            .iter()
            .map(|e| (e.equipment_name.as_str(), e))
            .collect();

        for record in maintenance {
            let Some(equipment) = record
                .equipment_name
                .as_deref()
                .and_then(|name| by_name.get(name))
            else {
                result.faults_unmatched += 1;
                continue;
            };

            let duration_us = seconds_to_micros(record.duration_min * 60.0).max(0);
            let end = record.start_datetime + Duration::microseconds(duration_us);

            result.events.push(EquipmentEvent {
                equipment_id: equipment.equipment_id,
                equipment_name: equipment.equipment_name.clone(),
                event_type: EventType::Fault,
                event_start_ts: record.start_datetime,
                event_end_ts: end,
                event_duration_sec: micros_to_seconds(duration_us),
                coil_id: None,
                parent_coil_id: None,
                shift_code: record.shifts.clone(),
                type_code: None,
                is_prime: false,
                is_scrap: false,
                event_date: record.start_datetime.date(),
            });
            result.fault_events += 1;
        }
    }
}

fn run_event(op: &CoilOperation) -> EquipmentEvent {
    EquipmentEvent {
        equipment_id: op.equipment_id,
        equipment_name: op.equipment_name.clone(),
        event_type: EventType::Run,
        event_start_ts: op.operation_start_ts,
        event_end_ts: op.operation_end_ts,
        event_duration_sec: op.operation_duration_sec,
        coil_id: Some(op.coil_id.clone()),
        parent_coil_id: Some(op.parent_coil_id.clone()),
        shift_code: Some(op.shift_code.clone()),
        type_code: op.type_code.clone(),
        is_prime: op.is_prime,
        is_scrap: op.is_scrap,
        event_date: op.operation_start_ts.date(),
    }
}

/// 空闲事件: 不携带卷/产品/班组信息
fn idle_event(prev: &CoilOperation, next: &CoilOperation) -> EquipmentEvent {
    let gap = next.operation_start_ts - prev.operation_end_ts;
    EquipmentEvent {
        equipment_id: next.equipment_id,
        equipment_name: next.equipment_name.clone(),
        event_type: EventType::Idle,
        event_start_ts: prev.operation_end_ts,
        event_end_ts: next.operation_start_ts,
        event_duration_sec: micros_to_seconds(gap.num_microseconds().unwrap_or(0)),
        coil_id: None,
        parent_coil_id: None,
        shift_code: None,
        type_code: None,
        is_prime: false,
        is_scrap: false,
        event_date: prev.operation_end_ts.date(),
    }
}
