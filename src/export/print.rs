// ==========================================
// PCA 采购计划 - 打印文档 (HTML)
// ==========================================
// 输出: 独立 HTML 页面,每个汇总物品一个 <section>,
//       贡献部门为嵌套 <ul>
// 红线: 所有插值文本必须 HTML 转义
// ==========================================

use crate::domain::consolidated::ConsolidatedItem;
use crate::engine::summary::PlanSummary;
use crate::export::error::ExportResult;
use crate::export::format::{format_date, format_money, format_quantity, FormatConfig};
use crate::i18n::{t_locale, t_locale_with_args};
use std::fmt::Write;

/// HTML 转义 (& < > " ')
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// 渲染打印用 HTML 文档
///
/// # 参数
/// - items: 汇总结果
/// - cfg: 展示格式
/// - title: 文档标题（None 时使用翻译后的默认标题）
pub fn render_print_html(
    items: &[ConsolidatedItem],
    cfg: &FormatConfig,
    title: Option<&str>,
) -> ExportResult<String> {
    let locale = cfg.locale.as_str();
    let label = |key: &str| escape_html(&t_locale(key, locale));
    let title = title
        .map(str::to_string)
        .unwrap_or_else(|| t_locale("export.title", locale));
    let summary = PlanSummary::from_items(items)?;

    // 写入 String 不会失败
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html lang=\"{}\">", escape_html(locale));
    let _ = writeln!(html, "<head><meta charset=\"utf-8\"><title>{}</title>", escape_html(&title));
    let _ = writeln!(
        html,
        "<style>body{{font-family:sans-serif}}section{{page-break-inside:avoid;margin-bottom:1em}}dt{{font-weight:bold}}</style>"
    );
    let _ = writeln!(html, "</head>\n<body>");
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(&title));
    let _ = writeln!(
        html,
        "<p class=\"summary\">{}</p>",
        escape_html(&t_locale_with_args(
            "export.summary",
            locale,
            &[
                ("items", &summary.item_count.to_string()),
                ("lines", &summary.line_count.to_string()),
                ("total", &format_money(summary.grand_total_value, cfg)),
            ],
        ))
    );

    for item in items {
        let _ = writeln!(html, "<section class=\"item\">");
        let _ = writeln!(
            html,
            "<h2>{} ({})</h2>",
            escape_html(&item.identity.description),
            escape_html(&item.identity.unit)
        );
        let _ = writeln!(html, "<dl>");
        let fields = [
            ("export.col_total_quantity", format_quantity(item.total_quantity, cfg)),
            ("export.col_total_value", format_money(item.total_value, cfg)),
            ("export.col_official_date", format_date(item.official_date, cfg)),
            (
                "export.col_official_priority",
                t_locale(item.official_priority.label_key(), locale),
            ),
        ];
        for (key, value) in fields {
            let _ = writeln!(html, "<dt>{}</dt><dd>{}</dd>", label(key), escape_html(&value));
        }
        let _ = writeln!(html, "</dl>");

        let _ = writeln!(html, "<h3>{}</h3>", label("export.contributors"));
        let _ = writeln!(html, "<ul class=\"contributors\">");
        for c in &item.contributors {
            let _ = writeln!(
                html,
                "<li>{}: {} | {}: {} | {}: {} | {}: {} | {}: {} | {}: {}</li>",
                label("export.col_department"),
                escape_html(&c.department),
                label("export.col_quantity"),
                escape_html(&format_quantity(c.quantity, cfg)),
                label("export.col_value"),
                escape_html(&format_money(c.value, cfg)),
                label("export.col_official_priority"),
                escape_html(&t_locale(c.priority.label_key(), locale)),
                label("export.col_date"),
                escape_html(&format_date(c.date, cfg)),
                label("export.col_source"),
                escape_html(&c.source_id),
            );
        }
        let _ = writeln!(html, "</ul>");
        let _ = writeln!(html, "</section>");
    }

    let _ = writeln!(html, "</body>\n</html>");
    Ok(html)
}
