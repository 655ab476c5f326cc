// ==========================================
// PCA 采购计划 - 导出错误类型
// ==========================================

use crate::engine::error::ValidationError;
use thiserror::Error;

/// 导出层错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    CsvWriteError(String),

    #[error("导出编码失败: {0}")]
    EncodingError(String),

    #[error("不支持的导出格式: {0}（仅支持 csv/html）")]
    UnsupportedFormat(String),

    #[error("计划统计失败: {0}")]
    Summary(#[from] ValidationError),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::CsvWriteError(err.to_string())
    }
}

impl<W> From<csv::IntoInnerError<W>> for ExportError {
    fn from(err: csv::IntoInnerError<W>) -> Self {
        ExportError::CsvWriteError(err.error().to_string())
    }
}

impl From<std::string::FromUtf8Error> for ExportError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ExportError::EncodingError(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
