// ==========================================
// PCA 采购计划 - 配置层
// ==========================================
// 职责: 系统配置管理 (导出格式、数据读取策略)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, FetchPolicy};
