// ==========================================
// PCA 采购计划 - 需求行校验
// ==========================================
// 职责: RawRequestLine → DepartmentRequestLine
// 规则:
// - 描述/单位/部门/来源标识 不可为空
// - 数量/金额 必须是十进制数且 >= 0 (不做负数归零)
// - 数值文本须可精确表示: 超出 28 位小数或含 '_' 的文本拒绝
// - 日期 YYYY-MM-DD (兼容 YYYYMMDD)
// - 优先级 必须可识别
// - 批内 source_id 唯一
// ==========================================

use crate::domain::identity::CatalogItemIdentity;
use crate::domain::request_line::{DepartmentRequestLine, RawRequestLine};
use crate::domain::types::Priority;
use crate::engine::error::ValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;

/// 校验单行
///
/// # 参数
/// - raw: 上游原始行
/// - row: 批内行号（从 1 开始），仅在 source_id 缺失时用于定位
pub fn validate_line(raw: &RawRequestLine, row: usize) -> Result<DepartmentRequestLine, ValidationError> {
    let source_id = raw.source_id.trim();
    if source_id.is_empty() {
        return Err(ValidationError::MissingSourceId { row });
    }

    let required = [
        ("description", &raw.description),
        ("unit", &raw.unit),
        ("department", &raw.department),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField {
                source_id: source_id.to_string(),
                field: field.to_string(),
            });
        }
    }

    let quantity = parse_non_negative(source_id, "quantity", &raw.quantity)?;
    let value = parse_non_negative(source_id, "value", &raw.value)?;
    let date = parse_date(source_id, &raw.date)?;
    let priority = Priority::from_str(&raw.priority).map_err(|_| ValidationError::InvalidPriority {
        source_id: source_id.to_string(),
        value: raw.priority.clone(),
    })?;

    Ok(DepartmentRequestLine {
        identity: CatalogItemIdentity::new(&raw.description, &raw.unit),
        department: raw.department.trim().to_string(),
        quantity,
        value,
        date,
        priority,
        source_id: source_id.to_string(),
    })
}

/// 校验整批（快速失败）
///
/// 首个非法行即返回错误，不产生部分结果。
pub fn validate_batch(raws: &[RawRequestLine]) -> Result<Vec<DepartmentRequestLine>, ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(raws.len());
    let mut lines = Vec::with_capacity(raws.len());

    for (idx, raw) in raws.iter().enumerate() {
        let line = validate_line(raw, idx + 1)?;
        if !seen.insert(raw.source_id.trim()) {
            return Err(ValidationError::DuplicateSourceId {
                source_id: line.source_id,
            });
        }
        lines.push(line);
    }

    Ok(lines)
}

fn parse_non_negative(source_id: &str, field: &str, text: &str) -> Result<Decimal, ValidationError> {
    let invalid = || ValidationError::InvalidNumber {
        source_id: source_id.to_string(),
        field: field.to_string(),
        value: text.to_string(),
    };

    let trimmed = text.trim();
    if trimmed.contains('_') {
        return Err(invalid());
    }

    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| invalid())?;

    // 解析结果的小数位少于文本声明的位数 = 已被舍入
    let scientific = trimmed.contains(|c| c == 'e' || c == 'E');
    let exact = match declared_scale(trimmed) {
        Some(scale) if scientific => scale <= MAX_SCALE,
        Some(scale) => scale <= i64::from(value.scale()),
        None => false,
    };
    if !exact {
        return Err(invalid());
    }

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::NegativeNumber {
            source_id: source_id.to_string(),
            field: field.to_string(),
            value: text.to_string(),
        });
    }

    Ok(value)
}

const MAX_SCALE: i64 = 28;

/// 文本声明的小数位数, 科学计数法按指数折算
fn declared_scale(text: &str) -> Option<i64> {
    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(pos) => (&text[..pos], text[pos + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    let fraction_digits = mantissa.split_once('.').map_or(0, |(_, frac)| frac.len() as i64);
    Some(fraction_digits - exponent)
}

fn parse_date(source_id: &str, text: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .map_err(|_| ValidationError::InvalidDate {
            source_id: source_id.to_string(),
            value: text.to_string(),
        })
}
