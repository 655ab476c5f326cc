// ==========================================
// PCA 采购计划 - 部门需求行仓储
// ==========================================
// 红线: Repository 不含业务逻辑,不做校验,不做汇总
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================
// 职责:
// - RequestLineSource: 数据源接口,每类查询一个强类型方法
// - SqliteRequestLineRepository: rusqlite 实现
// - InMemoryRequestLineRepository: 内存夹具实现（测试/演示）
// ==========================================

use crate::domain::request_line::RawRequestLine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// RequestLineSource Trait
// ==========================================
// 实现者: SqliteRequestLineRepository, InMemoryRequestLineRepository
#[async_trait]
pub trait RequestLineSource: Send + Sync {
    /// 查询某计划年度的全部需求行
    ///
    /// # 参数
    /// - year: 计划年度
    /// - tenant: 租户（None 表示不过滤租户）
    ///
    /// # 返回
    /// 按写入顺序排列的原始行；失败时整体返回错误，不返回部分数据
    async fn list_by_year(
        &self,
        year: i32,
        tenant: Option<&str>,
    ) -> RepositoryResult<Vec<RawRequestLine>>;

    /// 批量写入需求行（事务化，全部成功或全部回滚）
    async fn insert_batch(
        &self,
        lines: Vec<RawRequestLine>,
        year: i32,
        tenant: Option<&str>,
    ) -> RepositoryResult<usize>;

    /// 编辑已提交的需求行（按 租户 + source_id 定位）
    ///
    /// source_id 只在租户内唯一；tenant 为 None 时定位空租户。
    /// 汇总结果不落库，下次读取即按新数据重新汇总。
    async fn update(&self, line: &RawRequestLine, tenant: Option<&str>) -> RepositoryResult<()>;
}

// ==========================================
// SqliteRequestLineRepository
// ==========================================
pub struct SqliteRequestLineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRequestLineRepository {
    /// 创建新的仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(conn: &Mutex<Connection>) -> RepositoryResult<MutexGuard<'_, Connection>> {
        conn.lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_year(
        conn: &Connection,
        year: i32,
        tenant: Option<&str>,
    ) -> RepositoryResult<Vec<RawRequestLine>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT description, unit, department, quantity, value,
                   contract_date, priority, source_id
            FROM pca_request_line
            WHERE plan_year = ?1
              AND (?2 IS NULL OR tenant_id = ?2)
            ORDER BY rowid
            "#,
        )?;

        let lines = stmt
            .query_map(params![year, tenant], |row| {
                Ok(RawRequestLine {
                    description: row.get(0)?,
                    unit: row.get(1)?,
                    department: row.get(2)?,
                    quantity: row.get(3)?,
                    value: row.get(4)?,
                    date: row.get(5)?,
                    priority: row.get(6)?,
                    source_id: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<RawRequestLine>>>()?;

        Ok(lines)
    }
}

#[async_trait]
impl RequestLineSource for SqliteRequestLineRepository {
    async fn list_by_year(
        &self,
        year: i32,
        tenant: Option<&str>,
    ) -> RepositoryResult<Vec<RawRequestLine>> {
        let conn = Arc::clone(&self.conn);
        let tenant = tenant.map(str::to_string);

        tokio::task::spawn_blocking(move || {
            let guard = Self::lock(&conn)?;
            Self::query_year(&guard, year, tenant.as_deref())
        })
        .await?
    }

    async fn insert_batch(
        &self,
        lines: Vec<RawRequestLine>,
        year: i32,
        tenant: Option<&str>,
    ) -> RepositoryResult<usize> {
        let conn = Arc::clone(&self.conn);
        let tenant = tenant.unwrap_or("").to_string();

        tokio::task::spawn_blocking(move || {
            let mut guard = Self::lock(&conn)?;
            let tx = guard
                .transaction()
                .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

            let mut count = 0;
            {
                let mut stmt = tx.prepare(
                    r#"
                    INSERT INTO pca_request_line (
                        source_id, tenant_id, plan_year, description, unit,
                        department, quantity, value, contract_date, priority
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                )?;
                for line in &lines {
                    count += stmt.execute(params![
                        line.source_id,
                        tenant,
                        year,
                        line.description,
                        line.unit,
                        line.department,
                        line.quantity,
                        line.value,
                        line.date,
                        line.priority,
                    ])?;
                }
            }

            tx.commit()
                .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
            Ok(count)
        })
        .await?
    }

    async fn update(&self, line: &RawRequestLine, tenant: Option<&str>) -> RepositoryResult<()> {
        let conn = Arc::clone(&self.conn);
        let line = line.clone();
        let tenant = tenant.unwrap_or("").to_string();

        tokio::task::spawn_blocking(move || {
            let guard = Self::lock(&conn)?;
            let affected = guard.execute(
                r#"
                UPDATE pca_request_line
                SET description = ?2, unit = ?3, department = ?4, quantity = ?5,
                    value = ?6, contract_date = ?7, priority = ?8,
                    updated_at = datetime('now')
                WHERE source_id = ?1 AND tenant_id = ?9
                "#,
                params![
                    line.source_id,
                    line.description,
                    line.unit,
                    line.department,
                    line.quantity,
                    line.value,
                    line.date,
                    line.priority,
                    tenant,
                ],
            )?;

            if affected == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "pca_request_line".to_string(),
                    id: line.source_id,
                });
            }
            Ok(())
        })
        .await?
    }
}

// ==========================================
// InMemoryRequestLineRepository
// ==========================================
#[derive(Default)]
pub struct InMemoryRequestLineRepository {
    rows: Mutex<Vec<StoredLine>>,
}

struct StoredLine {
    year: i32,
    tenant: String,
    line: RawRequestLine,
}

impl InMemoryRequestLineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以夹具数据初始化（租户为空）
    pub fn with_lines(year: i32, lines: Vec<RawRequestLine>) -> Self {
        let rows = lines
            .into_iter()
            .map(|line| StoredLine {
                year,
                tenant: String::new(),
                line,
            })
            .collect();
        Self {
            rows: Mutex::new(rows),
        }
    }

    fn rows(&self) -> RepositoryResult<MutexGuard<'_, Vec<StoredLine>>> {
        self.rows
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl RequestLineSource for InMemoryRequestLineRepository {
    async fn list_by_year(
        &self,
        year: i32,
        tenant: Option<&str>,
    ) -> RepositoryResult<Vec<RawRequestLine>> {
        let rows = self.rows()?;
        Ok(rows
            .iter()
            .filter(|r| r.year == year && tenant.map_or(true, |t| r.tenant == t))
            .map(|r| r.line.clone())
            .collect())
    }

    async fn insert_batch(
        &self,
        lines: Vec<RawRequestLine>,
        year: i32,
        tenant: Option<&str>,
    ) -> RepositoryResult<usize> {
        let mut rows = self.rows()?;
        let tenant = tenant.unwrap_or("").to_string();
        if let Some(dup) = lines.iter().find(|l| {
            rows.iter()
                .any(|r| r.tenant == tenant && r.line.source_id == l.source_id)
        }) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "pca_request_line.tenant_id={}, source_id={}",
                tenant, dup.source_id
            )));
        }

        let count = lines.len();
        rows.extend(lines.into_iter().map(|line| StoredLine {
            year,
            tenant: tenant.clone(),
            line,
        }));
        Ok(count)
    }

    async fn update(&self, line: &RawRequestLine, tenant: Option<&str>) -> RepositoryResult<()> {
        let mut rows = self.rows()?;
        let tenant = tenant.unwrap_or("");
        match rows
            .iter_mut()
            .find(|r| r.tenant == tenant && r.line.source_id == line.source_id)
        {
            Some(stored) => {
                stored.line = line.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity: "pca_request_line".to_string(),
                id: line.source_id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source_id: &str) -> RawRequestLine {
        RawRequestLine {
            description: "Papel A4".to_string(),
            unit: "RESMA".to_string(),
            department: "Educação".to_string(),
            quantity: "12".to_string(),
            value: "318.00".to_string(),
            date: "2024-02-10".to_string(),
            priority: "LOW".to_string(),
            source_id: source_id.to_string(),
        }
    }

    fn sqlite_repo() -> SqliteRequestLineRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        SqliteRequestLineRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_sqlite_insert_and_list_by_year() {
        let repo = sqlite_repo();
        repo.insert_batch(vec![raw("a"), raw("b")], 2024, Some("prefeitura-x"))
            .await
            .unwrap();
        repo.insert_batch(vec![raw("c")], 2025, Some("prefeitura-x"))
            .await
            .unwrap();
        repo.insert_batch(vec![raw("d")], 2024, Some("prefeitura-y"))
            .await
            .unwrap();

        let lines = repo.list_by_year(2024, Some("prefeitura-x")).await.unwrap();
        let ids: Vec<&str> = lines.iter().map(|l| l.source_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        // 数值原文保留
        assert_eq!(lines[0].value, "318.00");

        let all = repo.list_by_year(2024, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_sqlite_batch_rolls_back_on_duplicate() {
        let repo = sqlite_repo();
        repo.insert_batch(vec![raw("a")], 2024, None).await.unwrap();

        let err = repo
            .insert_batch(vec![raw("b"), raw("a")], 2024, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

        let lines = repo.list_by_year(2024, None).await.unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_update() {
        let repo = sqlite_repo();
        repo.insert_batch(vec![raw("a")], 2024, None).await.unwrap();

        let mut edited = raw("a");
        edited.quantity = "20".to_string();
        repo.update(&edited, None).await.unwrap();

        let lines = repo.list_by_year(2024, None).await.unwrap();
        assert_eq!(lines[0].quantity, "20");

        let err = repo.update(&raw("missing"), None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_sqlite_same_source_id_in_two_tenants() {
        let repo = sqlite_repo();
        repo.insert_batch(vec![raw("DFD-2024-001")], 2024, Some("municipio-a"))
            .await
            .unwrap();
        repo.insert_batch(vec![raw("DFD-2024-001")], 2024, Some("municipio-b"))
            .await
            .unwrap();

        let mut edited = raw("DFD-2024-001");
        edited.quantity = "99".to_string();
        repo.update(&edited, Some("municipio-b")).await.unwrap();

        let a = repo.list_by_year(2024, Some("municipio-a")).await.unwrap();
        let b = repo.list_by_year(2024, Some("municipio-b")).await.unwrap();
        assert_eq!(a[0].quantity, "12");
        assert_eq!(b[0].quantity, "99");

        // 租户不匹配时不得改到其他租户的行
        let err = repo.update(&edited, Some("municipio-c")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_in_memory_repository() {
        let repo = InMemoryRequestLineRepository::with_lines(2024, vec![raw("a")]);
        repo.insert_batch(vec![raw("b")], 2024, Some("t1")).await.unwrap();

        assert_eq!(repo.list_by_year(2024, None).await.unwrap().len(), 2);
        assert_eq!(repo.list_by_year(2024, Some("t1")).await.unwrap().len(), 1);
        assert!(repo.list_by_year(2023, None).await.unwrap().is_empty());

        assert!(matches!(
            repo.insert_batch(vec![raw("a")], 2024, None).await,
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_in_memory_same_source_id_in_two_tenants() {
        let repo = InMemoryRequestLineRepository::new();
        repo.insert_batch(vec![raw("DFD-2024-001")], 2024, Some("municipio-a"))
            .await
            .unwrap();
        repo.insert_batch(vec![raw("DFD-2024-001")], 2024, Some("municipio-b"))
            .await
            .unwrap();

        let mut edited = raw("DFD-2024-001");
        edited.priority = "HIGH".to_string();
        repo.update(&edited, Some("municipio-a")).await.unwrap();

        let a = repo.list_by_year(2024, Some("municipio-a")).await.unwrap();
        let b = repo.list_by_year(2024, Some("municipio-b")).await.unwrap();
        assert_eq!(a[0].priority, "HIGH");
        assert_eq!(b[0].priority, "LOW");
        assert!(matches!(
            repo.update(&edited, None).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
