// ==========================================
// PCA 采购计划 - 需求汇总引擎
// ==========================================
// 职责: 将各部门需求行按目录物品汇总为年度计划条目
// 输入: 单个计划年度的需求行序列（无顺序要求）
// 输出: 每个目录物品标识一条 ConsolidatedItem
// ==========================================
// 规则:
// 1) 分组键 = 规范化 (描述, 单位)
// 2) 数量/金额 = 十进制精确求和
// 3) 正式日期 = 贡献者最早日期
// 4) 正式优先级 = 贡献者最高优先级 (High > Medium > Low)
// 5) 日期与优先级各自独立取值,不取自某个"胜出"贡献者
// 输出顺序: 物品按首次出现顺序,贡献者按输入顺序
// 溢出: 单项合计或全计划金额合计超出 Decimal 范围时,以导致溢出的行报错
// ==========================================

use crate::domain::consolidated::{ConsolidatedItem, Contributor};
use crate::domain::identity::CatalogItemIdentity;
use crate::domain::request_line::{DepartmentRequestLine, RawRequestLine};
use crate::domain::types::Priority;
use crate::engine::error::{EngineResult, ValidationError};
use crate::engine::validation::validate_batch;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

// ==========================================
// ConsolidationEngine - 需求汇总引擎
// ==========================================
pub struct ConsolidationEngine {
    // 无状态引擎,不需要注入依赖
}

impl ConsolidationEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验并汇总原始需求行
    ///
    /// # 返回
    /// - Ok(Vec<ConsolidatedItem>): 汇总结果（空输入返回空列表）
    /// - Err(EngineError::Validation): 首个非法行，附 source_id
    pub fn consolidate(&self, raws: &[RawRequestLine]) -> EngineResult<Vec<ConsolidatedItem>> {
        let lines = match validate_batch(raws) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(source_id = ?e.source_id(), error = %e, "需求行校验失败, 汇总终止");
                return Err(e.into());
            }
        };

        let items = match self.consolidate_validated(&lines) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(source_id = ?e.source_id(), error = %e, "合计溢出, 汇总终止");
                return Err(e.into());
            }
        };
        tracing::info!(
            lines = lines.len(),
            items = items.len(),
            "需求汇总完成"
        );
        Ok(items)
    }

    /// 汇总已校验的需求行（不修改输入）
    ///
    /// # 返回
    /// - Err(ValidationError::TotalOverflow): 累加到该行时合计超出 Decimal 范围
    pub fn consolidate_validated(
        &self,
        lines: &[DepartmentRequestLine],
    ) -> Result<Vec<ConsolidatedItem>, ValidationError> {
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut groups: Vec<GroupAccumulator> = Vec::new();
        // 打印页眉与日志使用全计划金额合计,这里保证其可表示
        let mut plan_value = Decimal::ZERO;

        for line in lines {
            plan_value = checked_sum(plan_value, line.value, line, "value")?;
            match index.get(line.identity.key()) {
                Some(&slot) => groups[slot].push(line)?,
                None => {
                    index.insert(line.identity.key().clone(), groups.len());
                    groups.push(GroupAccumulator::start(line));
                }
            }
        }

        Ok(groups
            .into_iter()
            .map(|group| {
                tracing::debug!(
                    item = %group.identity.description,
                    unit = %group.identity.unit,
                    contributors = group.contributors.len(),
                    "物品汇总"
                );
                group.finish()
            })
            .collect())
    }
}

impl Default for ConsolidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 便捷入口：使用默认引擎汇总
pub fn consolidate(raws: &[RawRequestLine]) -> EngineResult<Vec<ConsolidatedItem>> {
    ConsolidationEngine::new().consolidate(raws)
}

// ==========================================
// 分组累加器
// ==========================================
// 由至少一行构造,保证贡献者非空
struct GroupAccumulator {
    identity: CatalogItemIdentity,
    total_quantity: Decimal,
    total_value: Decimal,
    official_date: NaiveDate,
    official_priority: Priority,
    contributors: Vec<Contributor>,
}

impl GroupAccumulator {
    fn start(line: &DepartmentRequestLine) -> Self {
        Self {
            identity: line.identity.clone(),
            total_quantity: line.quantity,
            total_value: line.value,
            official_date: line.date,
            official_priority: line.priority,
            contributors: vec![contributor_of(line)],
        }
    }

    fn push(&mut self, line: &DepartmentRequestLine) -> Result<(), ValidationError> {
        self.total_quantity = checked_sum(self.total_quantity, line.quantity, line, "quantity")?;
        self.total_value = checked_sum(self.total_value, line.value, line, "value")?;
        self.official_date = self.official_date.min(line.date);
        self.official_priority = self.official_priority.max(line.priority);
        self.contributors.push(contributor_of(line));
        Ok(())
    }

    fn finish(self) -> ConsolidatedItem {
        ConsolidatedItem {
            identity: self.identity,
            total_quantity: self.total_quantity,
            total_value: self.total_value,
            official_date: self.official_date,
            official_priority: self.official_priority,
            contributors: self.contributors,
        }
    }
}

fn checked_sum(
    total: Decimal,
    addend: Decimal,
    line: &DepartmentRequestLine,
    field: &str,
) -> Result<Decimal, ValidationError> {
    total
        .checked_add(addend)
        .ok_or_else(|| ValidationError::TotalOverflow {
            source_id: line.source_id.clone(),
            field: field.to_string(),
        })
}

fn contributor_of(line: &DepartmentRequestLine) -> Contributor {
    Contributor {
        department: line.department.clone(),
        quantity: line.quantity,
        value: line.value,
        priority: line.priority,
        date: line.date,
        source_id: line.source_id.clone(),
    }
}
