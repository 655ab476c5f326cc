// ==========================================
// PCA 采购计划 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 缺省: 缺失键回落到内置默认值
// ==========================================

use crate::db::open_sqlite_connection;
use crate::export::format::FormatConfig;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// FetchPolicy - 数据读取策略
// ==========================================
// 由调用方在交给引擎前执行,引擎本身不重试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchPolicy {
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl FetchPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 2,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ===== 导出格式配置 =====

    /// 读取导出格式配置
    ///
    /// 单个键缺失时使用 FormatConfig::default() 中对应字段。
    pub fn get_format_config(&self) -> Result<FormatConfig, Box<dyn Error>> {
        let defaults = FormatConfig::default();
        Ok(FormatConfig {
            locale: self.get_config_or_default(config_keys::EXPORT_LOCALE, &defaults.locale)?,
            currency_symbol: self
                .get_config_or_default(config_keys::EXPORT_CURRENCY_SYMBOL, &defaults.currency_symbol)?,
            date_format: self
                .get_config_or_default(config_keys::EXPORT_DATE_FORMAT, &defaults.date_format)?,
            decimal_separator: self.get_config_or_default(
                config_keys::EXPORT_DECIMAL_SEPARATOR,
                &defaults.decimal_separator,
            )?,
            thousands_separator: self.get_config_or_default(
                config_keys::EXPORT_THOUSANDS_SEPARATOR,
                &defaults.thousands_separator,
            )?,
        })
    }

    // ===== 数据读取策略 =====

    /// 读取数据源超时与重试次数
    pub fn get_fetch_policy(&self) -> Result<FetchPolicy, Box<dyn Error>> {
        let defaults = FetchPolicy::default();

        let timeout_ms = match self.get_config_value(config_keys::FETCH_TIMEOUT_MS)? {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("配置值格式错误 ({}={}): {}", config_keys::FETCH_TIMEOUT_MS, v, e))?,
            None => defaults.timeout_ms,
        };
        let max_retries = match self.get_config_value(config_keys::FETCH_MAX_RETRIES)? {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .map_err(|e| format!("配置值格式错误 ({}={}): {}", config_keys::FETCH_MAX_RETRIES, v, e))?,
            None => defaults.max_retries,
        };

        Ok(FetchPolicy {
            timeout_ms,
            max_retries,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导出格式
    pub const EXPORT_LOCALE: &str = "export.locale";
    pub const EXPORT_CURRENCY_SYMBOL: &str = "export.currency_symbol";
    pub const EXPORT_DATE_FORMAT: &str = "export.date_format";
    pub const EXPORT_DECIMAL_SEPARATOR: &str = "export.decimal_separator";
    pub const EXPORT_THOUSANDS_SEPARATOR: &str = "export.thousands_separator";

    // 数据读取
    pub const FETCH_TIMEOUT_MS: &str = "fetch.timeout_ms";
    pub const FETCH_MAX_RETRIES: &str = "fetch.max_retries";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let cfg = manager();
        assert_eq!(cfg.get_format_config().unwrap(), FormatConfig::default());
        assert_eq!(cfg.get_fetch_policy().unwrap(), FetchPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = manager();
        cfg.set_global_config_value(config_keys::EXPORT_LOCALE, "en").unwrap();
        cfg.set_global_config_value(config_keys::EXPORT_CURRENCY_SYMBOL, "US$").unwrap();
        cfg.set_global_config_value(config_keys::FETCH_MAX_RETRIES, "5").unwrap();

        let format = cfg.get_format_config().unwrap();
        assert_eq!(format.locale, "en");
        assert_eq!(format.currency_symbol, "US$");
        // 未覆写的字段保持默认
        assert_eq!(format.date_format, "%d/%m/%Y");
        assert_eq!(cfg.get_fetch_policy().unwrap().max_retries, 5);
    }

    #[test]
    fn test_invalid_fetch_policy_value() {
        let cfg = manager();
        cfg.set_global_config_value(config_keys::FETCH_TIMEOUT_MS, "soon").unwrap();
        assert!(cfg.get_fetch_policy().is_err());
    }

    #[test]
    fn test_snapshot() {
        let cfg = manager();
        cfg.set_global_config_value(config_keys::EXPORT_LOCALE, "en").unwrap();
        cfg.set_global_config_value(config_keys::EXPORT_LOCALE, "pt-BR").unwrap();
        let snapshot: HashMap<String, String> =
            serde_json::from_str(&cfg.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[config_keys::EXPORT_LOCALE], "pt-BR");
    }
}
