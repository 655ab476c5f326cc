// ==========================================
// PCA 采购计划 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 快速失败,首个非法行即终止整个汇总
// ==========================================

use thiserror::Error;

/// 需求行校验错误
///
/// 每个变体都携带出错行的 source_id；source_id 本身缺失时以行号定位。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("来源标识缺失 (行 {row})")]
    MissingSourceId { row: usize },

    #[error("必填字段为空 (source_id={source_id}, 字段 {field})")]
    MissingField { source_id: String, field: String },

    #[error("数值格式错误 (source_id={source_id}, 字段 {field}): {value}")]
    InvalidNumber {
        source_id: String,
        field: String,
        value: String,
    },

    #[error("数值不能为负 (source_id={source_id}, 字段 {field}): {value}")]
    NegativeNumber {
        source_id: String,
        field: String,
        value: String,
    },

    #[error("日期格式错误 (source_id={source_id}): 期望 YYYY-MM-DD，实际 {value}")]
    InvalidDate { source_id: String, value: String },

    #[error("优先级无法识别 (source_id={source_id}): {value}")]
    InvalidPriority { source_id: String, value: String },

    #[error("来源标识重复: {source_id}")]
    DuplicateSourceId { source_id: String },

    #[error("合计超出十进制表示范围 (source_id={source_id}, 字段 {field})")]
    TotalOverflow { source_id: String, field: String },
}

impl ValidationError {
    /// 出错行的来源标识（缺失时为 None）
    pub fn source_id(&self) -> Option<&str> {
        match self {
            ValidationError::MissingSourceId { .. } => None,
            ValidationError::MissingField { source_id, .. }
            | ValidationError::InvalidNumber { source_id, .. }
            | ValidationError::NegativeNumber { source_id, .. }
            | ValidationError::InvalidDate { source_id, .. }
            | ValidationError::InvalidPriority { source_id, .. }
            | ValidationError::DuplicateSourceId { source_id }
            | ValidationError::TotalOverflow { source_id, .. } => Some(source_id),
        }
    }
}

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("需求行校验失败: {0}")]
    Validation(#[from] ValidationError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
