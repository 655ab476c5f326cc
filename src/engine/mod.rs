// ==========================================
// PCA 采购计划 - 引擎层
// ==========================================
// 职责: 需求汇总规则,纯计算
// 红线: Engine 不做 I/O, 不拼 SQL, 不决定重试策略
// ==========================================

pub mod consolidation;
pub mod error;
pub mod summary;
pub mod validation;

// 重导出核心引擎
pub use consolidation::{consolidate, ConsolidationEngine};
pub use error::{EngineError, EngineResult, ValidationError};
pub use summary::PlanSummary;
pub use validation::{validate_batch, validate_line};
