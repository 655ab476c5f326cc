// ==========================================
// PCA 采购计划 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行/界面调用
// ==========================================

pub mod error;
pub mod pca_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, Operation};
pub use pca_api::PcaApi;
