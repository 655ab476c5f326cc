// ==========================================
// PCA 采购计划 - 核心库
// ==========================================
// 系统定位: 年度采购计划 (PCA) 汇总
// 流程: 各部门需求行 (DFD) → 校验 → 按物品汇总 → 导出
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 校验与汇总
pub mod engine;

// 导出层 - CSV / 打印文档
pub mod export;

// 权限 - 角色与功能开关
pub mod access;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - DFD 表格文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CatalogItemIdentity, ConsolidatedItem, Contributor, DepartmentRequestLine, Priority,
    RawRequestLine,
};

// 引擎
pub use engine::{consolidate, ConsolidationEngine, EngineError, PlanSummary, ValidationError};

// 导出
pub use export::{export_csv, render_print_html, ExportFormat, FormatConfig};

// 权限
pub use access::{permissions_for, Permissions, Role};

// API
pub use api::{ApiError, PcaApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "PCA Planner";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_plan() {
        assert!(consolidate(&[]).unwrap().is_empty());
    }
}
