// ==========================================
// PCA 全流程集成测试
// ==========================================
// 覆盖: DFD 导入 → SQLite 落库 → 汇总 → 导出
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use pca_planner::api::{ApiError, Operation, PcaApi};
use pca_planner::config::{config_keys, ConfigManager};
use pca_planner::domain::Priority;
use pca_planner::export::ExportFormat;
use rust_decimal::Decimal;
use std::str::FromStr;
use test_helpers::{create_test_db, raw_line, write_dfd_csv};

const DFD_HEADER: &str = "ID;Descrição;Unidade;Secretaria;Quantidade;Valor;Data;Prioridade";

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[tokio::test]
async fn test_import_then_consolidate_two_departments() {
    pca_planner::logging::init_test();
    let (_tmp, db_path) = create_test_db().unwrap();
    let csv = write_dfd_csv(&[
        DFD_HEADER,
        "dfd-1;Computador Desktop;UN;Saúde;10;R$ 20.000,00;01/03/2024;Média",
        "dfd-2;computador  desktop;un;Educação;5;R$ 9.000,00;15/01/2024;Alta",
        "dfd-3;Papel A4;RESMA;Saúde;100;R$ 2.500,00;01/06/2024;Baixa",
    ])
    .unwrap();

    let api = PcaApi::from_db_path(&db_path).unwrap();
    assert_eq!(api.import_file(csv.path(), 2024, None).await.unwrap(), 3);

    let items = api.consolidate_year(2024, None).await.unwrap();
    assert_eq!(items.len(), 2);

    let desktop = &items[0];
    assert_eq!(desktop.identity.description, "Computador Desktop");
    assert_eq!(desktop.total_quantity, d("15"));
    assert_eq!(desktop.total_value, d("29000"));
    assert_eq!(desktop.official_date.to_string(), "2024-01-15");
    assert_eq!(desktop.official_priority, Priority::High);
    assert_eq!(desktop.departments(), vec!["Saúde", "Educação"]);

    assert_eq!(items[1].identity.description, "Papel A4");
    assert_eq!(items[1].contributors.len(), 1);
}

#[tokio::test]
async fn test_invalid_import_stores_nothing() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let csv = write_dfd_csv(&[
        DFD_HEADER,
        "dfd-1;Mesa;UN;Obras;1;100;01/03/2024;Baixa",
        "dfd-2;Mesa;UN;Saúde;-4;100;01/03/2024;Baixa",
    ])
    .unwrap();

    let api = PcaApi::from_db_path(&db_path).unwrap();
    let err = api.import_file(csv.path(), 2024, None).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ref v) if v.source_id() == Some("dfd-2")));
    assert_eq!(
        err.notification(Operation::Import, "pt-BR"),
        "Importar itens do DFD: o item dfd-2 possui dados inválidos"
    );

    assert!(api.consolidate_year(2024, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reimport_same_source_id_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let csv = write_dfd_csv(&[DFD_HEADER, "dfd-1;Mesa;UN;Obras;1;100;01/03/2024;Baixa"]).unwrap();

    let api = PcaApi::from_db_path(&db_path).unwrap();
    api.import_file(csv.path(), 2024, None).await.unwrap();
    let err = api.import_file(csv.path(), 2024, None).await.unwrap_err();
    assert!(matches!(err, ApiError::DataSource(_)));

    let items = api.consolidate_year(2024, None).await.unwrap();
    assert_eq!(items[0].total_quantity, d("1"));
}

#[tokio::test]
async fn test_tenants_and_years_are_isolated() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = PcaApi::from_db_path(&db_path).unwrap();

    api.submit_lines(
        vec![raw_line("Mesa", "UN", "Obras", "1", "100", "2024-03-01", "LOW", "a-1")],
        2024,
        Some("municipio-a"),
    )
    .await
    .unwrap();
    api.submit_lines(
        vec![raw_line("Mesa", "UN", "Obras", "7", "700", "2024-03-01", "LOW", "b-1")],
        2024,
        Some("municipio-b"),
    )
    .await
    .unwrap();
    api.submit_lines(
        vec![raw_line("Mesa", "UN", "Obras", "9", "900", "2025-03-01", "LOW", "a-2")],
        2025,
        Some("municipio-a"),
    )
    .await
    .unwrap();

    let a = api.consolidate_year(2024, Some("municipio-a")).await.unwrap();
    assert_eq!(a[0].total_quantity, d("1"));

    let all = api.consolidate_year(2024, None).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].total_quantity, d("8"));
}

#[tokio::test]
async fn test_two_tenants_share_dfd_number() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let csv = write_dfd_csv(&[DFD_HEADER, "DFD-2024-001;Mesa;UN;Obras;1;100;01/03/2024;Baixa"]).unwrap();

    let api = PcaApi::from_db_path(&db_path).unwrap();
    api.import_file(csv.path(), 2024, Some("municipio-a")).await.unwrap();
    api.import_file(csv.path(), 2024, Some("municipio-b")).await.unwrap();

    api.update_line(
        raw_line("Mesa", "UN", "Obras", "6", "600", "2024-03-01", "HIGH", "DFD-2024-001"),
        Some("municipio-b"),
    )
    .await
    .unwrap();

    let a = api.consolidate_year(2024, Some("municipio-a")).await.unwrap();
    let b = api.consolidate_year(2024, Some("municipio-b")).await.unwrap();
    assert_eq!(a[0].total_quantity, d("1"));
    assert_eq!(a[0].official_priority, Priority::Low);
    assert_eq!(b[0].total_quantity, d("6"));
    assert_eq!(b[0].official_priority, Priority::High);
}

#[tokio::test]
async fn test_edit_is_visible_on_next_consolidation() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = PcaApi::from_db_path(&db_path).unwrap();

    api.submit_lines(
        vec![
            raw_line("Cadeira", "UN", "Saúde", "2", "300", "2024-08-01", "LOW", "c-1"),
            raw_line("Cadeira", "UN", "Obras", "1", "150", "2024-09-01", "LOW", "c-2"),
        ],
        2024,
        None,
    )
    .await
    .unwrap();

    api.update_line(raw_line("Cadeira", "UN", "Obras", "1", "150", "2024-02-01", "HIGH", "c-2"), None)
        .await
        .unwrap();

    let items = api.consolidate_year(2024, None).await.unwrap();
    assert_eq!(items[0].official_date.to_string(), "2024-02-01");
    assert_eq!(items[0].official_priority, Priority::High);
}

#[tokio::test]
async fn test_export_uses_configured_format() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let config = ConfigManager::new(&db_path).unwrap();
        config.set_global_config_value(config_keys::EXPORT_LOCALE, "en").unwrap();
        config.set_global_config_value(config_keys::EXPORT_CURRENCY_SYMBOL, "$").unwrap();
        config.set_global_config_value(config_keys::EXPORT_DATE_FORMAT, "%Y-%m-%d").unwrap();
        config.set_global_config_value(config_keys::EXPORT_DECIMAL_SEPARATOR, ".").unwrap();
        config.set_global_config_value(config_keys::EXPORT_THOUSANDS_SEPARATOR, ",").unwrap();
    }

    let api = PcaApi::from_db_path(&db_path).unwrap();
    api.submit_lines(
        vec![
            raw_line("Desktop", "UN", "Health", "10", "20000", "2024-03-01", "MEDIUM", "1"),
            raw_line("Desktop", "UN", "Education", "5", "9000", "2024-01-15", "HIGH", "2"),
        ],
        2024,
        None,
    )
    .await
    .unwrap();

    let csv = String::from_utf8(api.export_year(2024, None, ExportFormat::Csv).await.unwrap()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Description,Unit,"));
    assert_eq!(
        lines[1],
        "Desktop,UN,15,\"$ 29,000.00\",2024-01-15,High,2,Health; Education"
    );

    let html = String::from_utf8(api.export_year(2024, None, ExportFormat::Html).await.unwrap()).unwrap();
    assert!(html.contains("Annual Procurement Plan"));
    assert!(html.contains("Education"));
}
