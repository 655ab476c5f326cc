// ==========================================
// PCA 采购计划 - 部门需求行
// ==========================================
// 来源: DFD (部门采购需求) 中的单个物品条目
// 生命周期: 提交后不可变,仅通过显式编辑修改并触发重新汇总
// ==========================================

use crate::domain::identity::CatalogItemIdentity;
use crate::domain::types::Priority;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// ==========================================
// RawRequestLine - 上游原始行
// ==========================================
// 形状: { description, unit, department, quantity, value, date, priority, sourceId }
// 数值字段保留原文,校验由引擎完成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequestLine {
    pub description: String,
    pub unit: String,
    pub department: String,
    #[serde(deserialize_with = "number_or_text")]
    pub quantity: String,
    #[serde(deserialize_with = "number_or_text")]
    pub value: String,
    pub date: String,
    pub priority: String,
    pub source_id: String,
}

/// 上游 JSON 中数量/金额可能是数字也可能是字符串
fn number_or_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "期望数字或字符串, 实际 {}",
            other
        ))),
    }
}

// ==========================================
// DepartmentRequestLine - 已校验需求行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRequestLine {
    pub identity: CatalogItemIdentity,
    pub department: String,
    pub quantity: Decimal,
    pub value: Decimal,
    pub date: NaiveDate,
    pub priority: Priority,
    pub source_id: String,
}
