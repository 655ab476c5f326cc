// ==========================================
// PCA 采购计划 - 字段映射器
// ==========================================
// 职责: 源列名 → RawRequestLine 字段 + 文本清洗
// 红线: 不做业务校验 (负数/日期/优先级由引擎校验)
// ==========================================
// 列名别名（忽略大小写与首尾空白）:
// description: descricao / descrição / item / description
// unit:        unidade / un / unit
// department:  secretaria / departamento / setor / department
// quantity:    quantidade / qtd / quantity
// value:       valor / valor_total / value
// date:        data / data_contratacao / date
// priority:    prioridade / priority
// source_id:   id / dfd / source_id / sourceid
// ==========================================

use crate::domain::request_line::RawRequestLine;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use chrono::{Duration, NaiveDate};

const DESCRIPTION: &[&str] = &["descricao", "descrição", "item", "description"];
const UNIT: &[&str] = &["unidade", "un", "unit"];
const DEPARTMENT: &[&str] = &["secretaria", "departamento", "setor", "department"];
const QUANTITY: &[&str] = &["quantidade", "qtd", "quantity"];
const VALUE: &[&str] = &["valor", "valor_total", "value"];
const DATE: &[&str] = &["data", "data_contratacao", "date"];
const PRIORITY: &[&str] = &["prioridade", "priority"];
const SOURCE_ID: &[&str] = &["id", "dfd", "source_id", "sourceid"];

pub struct FieldMapper;

impl FieldMapper {
    /// 校验表头包含全部必需列（source_id 可缺省）
    pub fn check_headers(&self, sample: &RawRecord) -> ImportResult<()> {
        let required = [
            ("description", DESCRIPTION),
            ("unit", UNIT),
            ("department", DEPARTMENT),
            ("quantity", QUANTITY),
            ("value", VALUE),
            ("date", DATE),
            ("priority", PRIORITY),
        ];
        for (name, aliases) in required {
            if find_column(sample, aliases).is_none() {
                return Err(ImportError::MissingColumn(name.to_string()));
            }
        }
        Ok(())
    }

    /// 映射单行
    ///
    /// # 参数
    /// - row: 原始行
    /// - row_number: 数据行号（从 1 开始）
    pub fn map_to_raw_line(&self, row: &RawRecord, row_number: usize) -> ImportResult<RawRequestLine> {
        let get = |aliases: &[&str]| -> String {
            find_column(row, aliases)
                .and_then(|key| row.get(key))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let source_id = match get(SOURCE_ID) {
            id if id.is_empty() => uuid::Uuid::new_v4().to_string(),
            id => id,
        };

        let line = RawRequestLine {
            description: get(DESCRIPTION),
            unit: get(UNIT),
            department: get(DEPARTMENT),
            quantity: normalize_decimal_text(&get(QUANTITY)),
            value: normalize_decimal_text(&get(VALUE)),
            date: normalize_date_text(&get(DATE)),
            priority: get(PRIORITY),
            source_id,
        };

        if line.description.is_empty() && line.unit.is_empty() && line.department.is_empty() {
            return Err(ImportError::FieldMappingError {
                row: row_number,
                message: "描述/单位/部门均为空".to_string(),
            });
        }

        Ok(line)
    }
}

fn find_column<'a>(row: &'a RawRecord, aliases: &[&str]) -> Option<&'a String> {
    row.keys()
        .find(|key| {
            let k = key.trim().to_lowercase();
            aliases.iter().any(|alias| *alias == k)
        })
}

/// 数值文本清洗
///
/// - 去除货币符号 `R$` 与空白
/// - 含 ',' 时视为 pt-BR 格式: '.' 为千分位, ',' 为小数点
/// - 否则原样保留
pub fn normalize_decimal_text(value: &str) -> String {
    let cleaned: String = value
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    }
}

/// 日期文本清洗
///
/// - `dd/mm/yyyy` 转为 `yyyy-mm-dd`
/// - Excel 日期序列号（纯数字, 1900 日期系统）转为 `yyyy-mm-dd`
/// - 其他格式原样保留，由引擎判定
pub fn normalize_date_text(value: &str) -> String {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return date.format("%Y-%m-%d").to_string();
    }

    if let Ok(serial) = trimmed.parse::<f64>() {
        // 8 位纯数字按 YYYYMMDD 处理，交给引擎
        if trimmed.len() != 8 && serial > 0.0 && serial < 2_958_466.0 {
            if let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) {
                if let Some(date) = epoch.checked_add_signed(Duration::days(serial.trunc() as i64)) {
                    return date.format("%Y-%m-%d").to_string();
                }
            }
        }
    }

    trimmed.to_string()
}
