// ==========================================
// PCA 采购计划 - API层错误类型
// ==========================================
// 职责: 汇总各层错误,转换为面向用户的提示
// 红线: 用户提示只包含操作名与简短原因,不暴露后端原始错误码
// ==========================================

use crate::engine::error::{EngineError, ValidationError};
use crate::export::error::ExportError;
use crate::i18n::{t_locale, t_locale_with_args};
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 用户可见的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Consolidate,
    Export,
    Import,
    Fetch,
}

impl Operation {
    fn label_key(&self) -> &'static str {
        match self {
            Operation::Consolidate => "operation.consolidate",
            Operation::Export => "operation.export",
            Operation::Import => "operation.import",
            Operation::Fetch => "operation.fetch",
        }
    }
}

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 输入错误 =====
    #[error("需求行校验失败: {0}")]
    Validation(#[from] ValidationError),

    // ===== 数据源错误 =====
    #[error("数据源读取超时: timeout={timeout_ms}ms, attempts={attempts}")]
    FetchTimeout { timeout_ms: u64, attempts: u32 },

    #[error("数据源错误: {0}")]
    DataSource(String),

    // ===== 导入/导出错误 =====
    #[error("导入失败: {0}")]
    Import(String),

    #[error("导出失败: {0}")]
    Export(String),

    // ===== 配置错误 =====
    #[error("配置错误: {0}")]
    Config(String),
}

impl ApiError {
    /// 生成用户提示
    ///
    /// 形如 "Consolidar PCA: o item dfd-9 possui dados inválidos"
    pub fn notification(&self, operation: Operation, locale: &str) -> String {
        let cause = match self {
            ApiError::Validation(v) => match v.source_id() {
                Some(id) => t_locale_with_args("notify.invalid_line", locale, &[("source_id", id)]),
                None => t_locale("notify.invalid_line_no_id", locale),
            },
            ApiError::FetchTimeout { .. } => t_locale("notify.fetch_timeout", locale),
            ApiError::DataSource(_) | ApiError::Config(_) => t_locale("notify.data_unavailable", locale),
            ApiError::Import(_) => t_locale("notify.import_failed", locale),
            ApiError::Export(_) => t_locale("notify.export_failed", locale),
        };
        format!("{}: {}", t_locale(operation.label_key(), locale), cause)
    }

    /// 汇总并导出时的失败归属: 导出阶段归 Export, 读取与汇总归 Consolidate
    pub fn consolidate_stage(&self) -> Operation {
        match self {
            ApiError::Export(_) => Operation::Export,
            _ => Operation::Consolidate,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(v) => ApiError::Validation(v),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::DataSource(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Export(err.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::Import(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
