// ==========================================
// PCA 采购计划 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod consolidated;
pub mod identity;
pub mod request_line;
pub mod types;

// 重导出核心类型
pub use consolidated::{ConsolidatedItem, Contributor};
pub use identity::{normalize_identity_text, CatalogItemIdentity};
pub use request_line::{DepartmentRequestLine, RawRequestLine};
pub use types::{Priority, UnknownPriority};
