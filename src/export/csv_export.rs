// ==========================================
// PCA 采购计划 - 表格导出 (CSV)
// ==========================================
// 输出: 一行表头 + 每个汇总物品一行
// 转义: 交给 csv 写入器
// 红线: 只渲染 ConsolidatedItem 已有的值,不重新计算合计
// ==========================================

use crate::domain::consolidated::ConsolidatedItem;
use crate::export::error::ExportResult;
use crate::export::format::{format_date, format_money, format_quantity, FormatConfig};
use crate::i18n::t_locale;
use csv::{QuoteStyle, WriterBuilder};

const HEADER_KEYS: [&str; 8] = [
    "export.col_description",
    "export.col_unit",
    "export.col_total_quantity",
    "export.col_total_value",
    "export.col_official_date",
    "export.col_official_priority",
    "export.col_department_count",
    "export.col_departments",
];

/// 导出 CSV 文本
///
/// 小数点为 ',' 的区域使用 ';' 作为列分隔符，避免金额被拆列。
pub fn export_csv(items: &[ConsolidatedItem], cfg: &FormatConfig) -> ExportResult<String> {
    let delimiter = if cfg.decimal_separator == "," { b';' } else { b',' };
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    let header: Vec<String> = HEADER_KEYS
        .iter()
        .map(|key| t_locale(key, &cfg.locale))
        .collect();
    writer.write_record(&header)?;

    for item in items {
        writer.write_record([
            item.identity.description.clone(),
            item.identity.unit.clone(),
            format_quantity(item.total_quantity, cfg),
            format_money(item.total_value, cfg),
            format_date(item.official_date, cfg),
            t_locale(item.official_priority.label_key(), &cfg.locale),
            item.departments().len().to_string(),
            item.departments().join("; "),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request_line::RawRequestLine;
    use crate::engine::consolidate;

    fn raw(description: &str, department: &str, source_id: &str) -> RawRequestLine {
        RawRequestLine {
            description: description.to_string(),
            unit: "UN".to_string(),
            department: department.to_string(),
            quantity: "2".to_string(),
            value: "1500.5".to_string(),
            date: "2024-01-15".to_string(),
            priority: "HIGH".to_string(),
            source_id: source_id.to_string(),
        }
    }

    #[test]
    fn test_export_csv_header_and_rows() {
        let items = consolidate(&[
            raw("Desktop Computer", "Saúde", "1"),
            raw("Desktop Computer", "Educação", "2"),
            raw("Papel A4", "Saúde", "3"),
        ])
        .unwrap();

        let text = export_csv(&items, &FormatConfig::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Descrição;Unidade;"));
        assert_eq!(
            lines[1],
            "Desktop Computer;UN;4;R$ 3.001,00;15/01/2024;Alta;2;\"Saúde; Educação\""
        );
    }

    #[test]
    fn test_export_csv_escapes_cells() {
        let items = consolidate(&[raw("Cabo \"HDMI\", 2m", "TI", "1")]).unwrap();
        let text = export_csv(&items, &FormatConfig::en()).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "Cabo \"HDMI\", 2m");
        assert_eq!(&record[3], "$ 3,001.00");
        assert_eq!(&record[5], "High");
    }

    #[test]
    fn test_export_csv_empty_has_header_only() {
        let text = export_csv(&[], &FormatConfig::en()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Description,Unit,"));
    }
}
