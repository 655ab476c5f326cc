// ==========================================
// PCA 采购计划 - 导出层
// ==========================================
// 职责: 将汇总结果渲染为表格文本或打印文档
// 红线: 只格式化,不重新推导合计
// ==========================================

pub mod csv_export;
pub mod error;
pub mod format;
pub mod print;

use crate::domain::consolidated::ConsolidatedItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use csv_export::export_csv;
pub use error::{ExportError, ExportResult};
pub use format::{format_date, format_money, format_quantity, FormatConfig};
pub use print::{escape_html, render_print_html};

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Html,
}

impl ExportFormat {
    /// 建议的文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" | "print" => Ok(ExportFormat::Html),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// 按格式导出为字节
pub fn export(
    items: &[ConsolidatedItem],
    format: ExportFormat,
    cfg: &FormatConfig,
) -> ExportResult<Vec<u8>> {
    let text = match format {
        ExportFormat::Csv => export_csv(items, cfg)?,
        ExportFormat::Html => render_print_html(items, cfg, None)?,
    };
    Ok(text.into_bytes())
}
