// ==========================================
// 精整线时序合成 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("产线拓扑为空: 检修记录中没有任何设备能映射到工序号")]
    EmptyLine,

    #[error("导出失败 ({table}): {message}")]
    Export { table: String, message: String },

    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写出失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
