// ==========================================
// PCA 采购计划 - 导入层
// ==========================================
// 职责: 从 DFD 表格文件读取需求行
// 支持: Excel (.xlsx), CSV
// 流程: 文件解析 → 表头检查 → 字段映射
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;

use crate::domain::request_line::RawRequestLine;
use std::path::Path;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};

/// DFD 文件导入器
///
/// 只负责“文件 → RawRequestLine”，校验与落库由调用方完成。
pub struct DfdFileImporter {
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl DfdFileImporter {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
        }
    }

    pub fn read_lines<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRequestLine>> {
        let path = file_path.as_ref();
        let records = self.parser.parse(path)?;

        if let Some(first) = records.first() {
            self.mapper.check_headers(first)?;
        }

        let lines = records
            .iter()
            .enumerate()
            .map(|(idx, row)| self.mapper.map_to_raw_line(row, idx + 1))
            .collect::<ImportResult<Vec<_>>>()?;

        tracing::info!(file = %path.display(), rows = lines.len(), "DFD 文件解析完成");
        Ok(lines)
    }
}

impl Default for DfdFileImporter {
    fn default() -> Self {
        Self::new()
    }
}
