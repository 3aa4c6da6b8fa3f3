// ==========================================
// 精整线时序合成 - 配置层
// ==========================================
// 职责: 流水线运行参数 + 产线静态配置档
// 存储: 可选 JSON 文件, 默认值即现场口径
// ==========================================

pub mod line_profile;
pub mod pipeline_config;

// 重导出核心配置
pub use line_profile::{LineProfile, ProductMixBands, UniformRange};
pub use pipeline_config::{
    config_keys, DateWindow, GapPolicy, PipelineConfig, ProductClassification, ShiftWindow,
};
