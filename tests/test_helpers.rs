// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use pca_planner::domain::RawRequestLine;
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("路径非 UTF-8")?.to_string();

    let conn = pca_planner::db::open_sqlite_connection(&db_path)?;
    pca_planner::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入 DFD CSV 文件（首行为表头）
pub fn write_dfd_csv(lines: &[&str]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(file)
}

/// 构造需求行
pub fn raw_line(
    description: &str,
    unit: &str,
    department: &str,
    quantity: &str,
    value: &str,
    date: &str,
    priority: &str,
    source_id: &str,
) -> RawRequestLine {
    RawRequestLine {
        description: description.to_string(),
        unit: unit.to_string(),
        department: department.to_string(),
        quantity: quantity.to_string(),
        value: value.to_string(),
        date: date.to_string(),
        priority: priority.to_string(),
        source_id: source_id.to_string(),
    }
}
