// ==========================================
// PCA 采购计划 - 命令行入口
// ==========================================
// 子命令: import / consolidate / permissions / config
// 数据库路径: --db > PCA_PLANNER_DB_PATH > 用户数据目录
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use pca_planner::access::{permissions_for, Permissions, Role};
use pca_planner::api::{ApiError, Operation, PcaApi};
use pca_planner::config::ConfigManager;
use pca_planner::export::{ExportFormat, FormatConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pca-planner")]
#[command(version)]
#[command(about = "Consolidate departmental procurement requests into the annual contracting plan")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file
    #[arg(long, global = true, env = "PCA_PLANNER_DB_PATH")]
    db: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import DFD request lines from a .csv or .xlsx file
    Import {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        year: i32,

        #[arg(long)]
        tenant: Option<String>,
    },

    /// Consolidate a plan year and export it
    Consolidate {
        #[arg(short, long)]
        year: i32,

        #[arg(long)]
        tenant: Option<String>,

        /// csv or html
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Output file (stdout if not provided)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show the capability flags granted to a role
    Permissions {
        #[arg(short, long)]
        role: Role,
    },

    /// Show or change global settings
    Config {
        /// key=value, may be repeated
        #[arg(long)]
        set: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    pca_planner::logging::init(cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_path = match cli.db {
        Some(path) => path.display().to_string(),
        None => get_default_db_path(),
    };
    tracing::debug!(version = pca_planner::VERSION, db = %db_path, "{} 启动", pca_planner::APP_NAME);

    match cli.command {
        Commands::Import { file, year, tenant } => {
            let api = open_api(&db_path)?;
            let count = api
                .import_file(&file, year, tenant.as_deref())
                .await
                .map_err(|e| user_error(&api, e, Operation::Import))?;
            println!("{}", count);
        }
        Commands::Consolidate {
            year,
            tenant,
            format,
            out,
        } => {
            let api = open_api(&db_path)?;
            let bytes = api
                .export_year(year, tenant.as_deref(), format)
                .await
                .map_err(|e| {
                    let operation = e.consolidate_stage();
                    user_error(&api, e, operation)
                })?;
            match out {
                Some(path) => std::fs::write(&path, bytes)
                    .with_context(|| format!("写入失败: {}", path.display()))?,
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&bytes)?;
                }
            }
        }
        Commands::Permissions { role } => {
            let permissions = permissions_for(role);
            for flag in Permissions::FLAGS {
                println!("{}\t{}", flag, permissions.allows(flag));
            }
        }
        Commands::Config { set } => {
            let conn = pca_planner::db::open_sqlite_connection(&db_path)?;
            pca_planner::db::init_schema(&conn)?;
            let config = ConfigManager::from_connection(std::sync::Arc::new(std::sync::Mutex::new(conn)))
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            for pair in &set {
                let (key, value) = pair
                    .split_once('=')
                    .with_context(|| format!("无效配置项 (应为 key=value): {}", pair))?;
                config
                    .set_global_config_value(key.trim(), value.trim())
                    .map_err(|e| anyhow::anyhow!("{}", e))?;
            }
            let snapshot = config.get_config_snapshot().map_err(|e| anyhow::anyhow!("{}", e))?;
            println!("{}", snapshot);
        }
    }

    Ok(())
}

fn open_api(db_path: &str) -> anyhow::Result<PcaApi> {
    PcaApi::from_db_path(db_path).map_err(|e| {
        tracing::error!(error = %e, db = %db_path, "初始化失败");
        anyhow::anyhow!(e.notification(Operation::Fetch, &FormatConfig::default().locale))
    })
}

/// 记录原始错误, 返回面向用户的提示
fn user_error(api: &PcaApi, err: ApiError, operation: Operation) -> anyhow::Error {
    tracing::error!(error = %err, ?operation, "操作失败");
    anyhow::anyhow!(err.notification(operation, &api.format_config().locale))
}

/// 获取默认数据库路径
fn get_default_db_path() -> String {
    let mut path = PathBuf::from("./pca_planner.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("pca-planner");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("pca_planner.db");
        }
    }

    path.display().to_string()
}
