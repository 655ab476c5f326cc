// ==========================================
// PCA 采购计划 - PCA API
// ==========================================
// 职责: 串联 数据源读取 → 汇总引擎 → 导出
// 约束:
// - 读取由本层施加超时与有限重试,引擎不感知
// - 读取失败或超时不得把部分数据交给引擎
// - 汇总结果不缓存,每次按当前数据重新计算
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, FetchPolicy};
use crate::domain::consolidated::ConsolidatedItem;
use crate::domain::request_line::RawRequestLine;
use crate::engine::{validate_batch, validate_line, ConsolidationEngine, PlanSummary};
use crate::export::{self, ExportFormat, FormatConfig};
use crate::importer::DfdFileImporter;
use crate::repository::{RequestLineSource, SqliteRequestLineRepository};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 重试间隔基数（第 n 次重试等待 n × 基数）
const RETRY_BACKOFF_MS: u64 = 200;

pub struct PcaApi {
    source: Arc<dyn RequestLineSource>,
    engine: ConsolidationEngine,
    format: FormatConfig,
    fetch_policy: FetchPolicy,
}

impl PcaApi {
    pub fn new(
        source: Arc<dyn RequestLineSource>,
        format: FormatConfig,
        fetch_policy: FetchPolicy,
    ) -> Self {
        Self {
            source,
            engine: ConsolidationEngine::new(),
            format,
            fetch_policy,
        }
    }

    /// 基于 SQLite 数据库文件创建
    ///
    /// 仓储与配置共享同一连接；导出格式与读取策略从 config_kv 读取。
    pub fn from_db_path(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DataSource(e.to_string()))?;
        crate::db::init_schema(&conn).map_err(|e| ApiError::DataSource(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::Config(e.to_string()))?;
        let format = config
            .get_format_config()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        let fetch_policy = config
            .get_fetch_policy()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let repo = SqliteRequestLineRepository::from_connection(conn);
        Ok(Self::new(Arc::new(repo), format, fetch_policy))
    }

    pub fn format_config(&self) -> &FormatConfig {
        &self.format
    }

    // ==========================================
    // 数据读取（超时 + 有限重试）
    // ==========================================

    /// 读取某年度的完整需求行
    pub async fn fetch_lines(&self, year: i32, tenant: Option<&str>) -> ApiResult<Vec<RawRequestLine>> {
        let attempts = self.fetch_policy.max_retries + 1;
        let mut last_err = ApiError::DataSource("未执行读取".to_string());

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt - 1))).await;
            }

            match tokio::time::timeout(
                self.fetch_policy.timeout(),
                self.source.list_by_year(year, tenant),
            )
            .await
            {
                Ok(Ok(lines)) => {
                    tracing::debug!(year, ?tenant, attempt, rows = lines.len(), "需求行读取完成");
                    return Ok(lines);
                }
                Ok(Err(e)) => {
                    tracing::warn!(year, ?tenant, attempt, error = %e, "需求行读取失败");
                    last_err = e.into();
                }
                Err(_) => {
                    tracing::warn!(year, ?tenant, attempt, timeout_ms = self.fetch_policy.timeout_ms, "需求行读取超时");
                    last_err = ApiError::FetchTimeout {
                        timeout_ms: self.fetch_policy.timeout_ms,
                        attempts: attempt,
                    };
                }
            }
        }

        tracing::error!(year, ?tenant, error = %last_err, "需求行读取最终失败");
        Err(last_err)
    }

    // ==========================================
    // 汇总
    // ==========================================

    /// 汇总某年度的需求
    pub async fn consolidate_year(&self, year: i32, tenant: Option<&str>) -> ApiResult<Vec<ConsolidatedItem>> {
        let lines = self.fetch_lines(year, tenant).await?;
        let items = self.engine.consolidate(&lines)?;

        let summary = PlanSummary::from_items(&items)?;
        tracing::info!(
            year,
            ?tenant,
            items = summary.item_count,
            lines = summary.line_count,
            total_value = %summary.grand_total_value,
            "PCA 汇总完成"
        );
        Ok(items)
    }

    /// 汇总并导出
    pub async fn export_year(
        &self,
        year: i32,
        tenant: Option<&str>,
        format: ExportFormat,
    ) -> ApiResult<Vec<u8>> {
        let items = self.consolidate_year(year, tenant).await?;
        let bytes = export::export(&items, format, &self.format)?;
        tracing::info!(year, %format, bytes = bytes.len(), "PCA 导出完成");
        Ok(bytes)
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 导入 DFD 文件
    ///
    /// 整批校验通过后才落库；任一行非法则整批拒绝。
    pub async fn import_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        year: i32,
        tenant: Option<&str>,
    ) -> ApiResult<usize> {
        let lines = DfdFileImporter::new().read_lines(file_path)?;
        validate_batch(&lines)?;

        let count = self.source.insert_batch(lines, year, tenant).await?;
        tracing::info!(year, ?tenant, rows = count, "DFD 导入完成");
        Ok(count)
    }

    /// 提交需求行
    pub async fn submit_lines(
        &self,
        lines: Vec<RawRequestLine>,
        year: i32,
        tenant: Option<&str>,
    ) -> ApiResult<usize> {
        validate_batch(&lines)?;
        Ok(self.source.insert_batch(lines, year, tenant).await?)
    }

    /// 编辑已提交的需求行（按 租户 + source_id 定位）
    pub async fn update_line(&self, line: RawRequestLine, tenant: Option<&str>) -> ApiResult<()> {
        validate_line(&line, 1)?;
        self.source.update(&line, tenant).await?;
        tracing::info!(source_id = %line.source_id, ?tenant, "需求行已更新, 下次汇总生效");
        Ok(())
    }
}
