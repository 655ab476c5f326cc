// ==========================================
// PCA 采购计划 - 计划汇总统计
// ==========================================
// 职责: 对引擎输出做只读统计,供日志与打印页眉使用
// 红线: 不重新推导单项合计
// ==========================================

use crate::domain::consolidated::ConsolidatedItem;
use crate::domain::types::Priority;
use crate::engine::error::ValidationError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// 计划汇总统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub item_count: usize,
    pub line_count: usize,
    pub grand_total_value: Decimal,
    pub items_by_priority: BTreeMap<Priority, usize>,
    pub earliest_date: Option<NaiveDate>,
}

impl PlanSummary {
    /// 统计汇总结果
    ///
    /// 金额总计溢出时返回 TotalOverflow，定位到该物品的首个贡献行。
    /// 引擎输出已保证全计划金额合计可表示。
    pub fn from_items(items: &[ConsolidatedItem]) -> Result<Self, ValidationError> {
        let mut items_by_priority: BTreeMap<Priority, usize> =
            Priority::ALL.iter().map(|p| (*p, 0)).collect();
        let mut grand_total_value = Decimal::ZERO;
        let mut line_count = 0;

        for item in items {
            grand_total_value = grand_total_value
                .checked_add(item.total_value)
                .ok_or_else(|| ValidationError::TotalOverflow {
                    source_id: item
                        .contributors
                        .first()
                        .map(|c| c.source_id.clone())
                        .unwrap_or_default(),
                    field: "value".to_string(),
                })?;
            line_count += item.contributors.len();
            *items_by_priority.entry(item.official_priority).or_insert(0) += 1;
        }

        Ok(Self {
            item_count: items.len(),
            line_count,
            grand_total_value,
            items_by_priority,
            earliest_date: items.iter().map(|i| i.official_date).min(),
        })
    }
}
