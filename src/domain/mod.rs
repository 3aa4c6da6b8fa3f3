// ==========================================
// 精整线时序合成 - 领域模型层
// ==========================================
// 职责: 定义维度/事实记录与基础类型
// 红线: 不含文件访问逻辑, 不含合成逻辑
// ==========================================

pub mod crew;
pub mod equipment;
pub mod event;
pub mod maintenance;
pub mod operation;
pub mod production;
pub mod types;

// 重导出核心类型
pub use crew::CrewAssignment;
pub use equipment::Equipment;
pub use event::EquipmentEvent;
pub use maintenance::{MaintenanceEvent, RawMaintenanceRecord};
pub use operation::CoilOperation;
pub use production::{ProductionCoil, RawProductionRecord};
pub use types::{EventType, ProductBand, Section};
