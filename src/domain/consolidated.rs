// ==========================================
// PCA 采购计划 - 汇总物品
// ==========================================
// 引擎输出单元: 每个目录物品标识一条
// 生命周期: 按需由当前需求行重新计算,不落库,不做局部更新
// ==========================================
// 不变量:
// - total_quantity == Σ contributor.quantity
// - total_value == Σ contributor.value
// - contributors 非空,source_id 唯一
// ==========================================

use crate::domain::identity::CatalogItemIdentity;
use crate::domain::types::Priority;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// 贡献部门摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub department: String,
    pub quantity: Decimal,
    pub value: Decimal,
    pub priority: Priority,
    pub date: NaiveDate,
    pub source_id: String,
}

/// 汇总物品
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedItem {
    pub identity: CatalogItemIdentity,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    /// 正式签约日期 = 贡献者最早日期
    pub official_date: NaiveDate,
    /// 正式优先级 = 贡献者最高优先级
    pub official_priority: Priority,
    pub contributors: Vec<Contributor>,
}

impl ConsolidatedItem {
    /// 参与部门名称（按贡献顺序去重）
    pub fn departments(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.contributors.len());
        for c in &self.contributors {
            if !names.contains(&c.department.as_str()) {
                names.push(c.department.as_str());
            }
        }
        names
    }
}
