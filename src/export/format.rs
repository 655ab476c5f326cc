// ==========================================
// PCA 采购计划 - 展示格式配置
// ==========================================
// 职责: 货币/日期/数量的本地化格式化
// 默认: pt-BR, R$, dd/mm/yyyy, 小数点 ',' 千分位 '.'
// ==========================================

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 展示格式配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    pub locale: String,
    pub currency_symbol: String,
    /// chrono 格式串
    pub date_format: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            locale: "pt-BR".to_string(),
            currency_symbol: "R$".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            decimal_separator: ",".to_string(),
            thousands_separator: ".".to_string(),
        }
    }
}

impl FormatConfig {
    /// 英文格式预设
    pub fn en() -> Self {
        Self {
            locale: "en".to_string(),
            currency_symbol: "$".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
        }
    }
}

/// 金额格式化: 保留两位小数（四舍五入，远离零），千分位分组，前缀货币符号
///
/// # 示例
/// `29000` → `R$ 29.000,00`
pub fn format_money(value: Decimal, cfg: &FormatConfig) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let body = group_number(&rounded.abs().to_string(), cfg);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };

    if cfg.currency_symbol.is_empty() {
        format!("{}{}", sign, body)
    } else {
        format!("{}{} {}", sign, cfg.currency_symbol, body)
    }
}

/// 数量格式化: 去除尾随零，使用配置的小数点
pub fn format_quantity(value: Decimal, cfg: &FormatConfig) -> String {
    let normalized = value.normalize();
    let body = group_number(&normalized.abs().to_string(), cfg);
    if normalized.is_sign_negative() && !normalized.is_zero() {
        format!("-{}", body)
    } else {
        body
    }
}

/// 日期格式化
pub fn format_date(date: NaiveDate, cfg: &FormatConfig) -> String {
    date.format(&cfg.date_format).to_string()
}

/// 对非负十进制文本（形如 `12345.67`）做千分位分组并替换小数点
fn group_number(plain: &str, cfg: &FormatConfig) -> String {
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain, None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push_str(&cfg.thousands_separator);
        }
        grouped.push(*ch);
    }

    match frac_part {
        Some(f) if !f.is_empty() => format!("{}{}{}", grouped, cfg.decimal_separator, f),
        _ => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_money_pt_br() {
        let cfg = FormatConfig::default();
        assert_eq!(format_money(d("29000"), &cfg), "R$ 29.000,00");
        assert_eq!(format_money(d("1234567.891"), &cfg), "R$ 1.234.567,89");
        assert_eq!(format_money(d("0.005"), &cfg), "R$ 0,01");
        assert_eq!(format_money(d("999.999"), &cfg), "R$ 1.000,00");
        assert_eq!(format_money(Decimal::ZERO, &cfg), "R$ 0,00");
    }

    #[test]
    fn test_format_money_en() {
        let cfg = FormatConfig::en();
        assert_eq!(format_money(d("9000.5"), &cfg), "$ 9,000.50");
        assert_eq!(format_money(d("-12.345"), &cfg), "-$ 12.35");
    }

    #[test]
    fn test_format_money_without_symbol() {
        let cfg = FormatConfig {
            currency_symbol: String::new(),
            ..FormatConfig::default()
        };
        assert_eq!(format_money(d("100"), &cfg), "100,00");
    }

    #[test]
    fn test_format_quantity() {
        let cfg = FormatConfig::default();
        assert_eq!(format_quantity(d("15.000"), &cfg), "15");
        assert_eq!(format_quantity(d("2.50"), &cfg), "2,5");
        assert_eq!(format_quantity(d("12000"), &cfg), "12.000");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(format_date(date, &FormatConfig::default()), "15/01/2024");
        assert_eq!(format_date(date, &FormatConfig::en()), "2024-01-15");
    }
}
