//! # mizu
//!
//! Task tracker server binary — opens the database, runs migrations, and
//! starts the HTTP server.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mizu_server::{AppState, ServerConfig};
use mizu_tasks::ConnectionConfig;
use tracing_subscriber::EnvFilter;

/// mizu task tracker server.
#[derive(Parser, Debug)]
#[command(name = "mizu", about = "Personal task tracker server")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "4820")]
    port: u16,

    /// Path to the `SQLite` database.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

impl Cli {
    fn default_db_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".mizu").join("mizu.db")
    }
}

fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db_path = args.db_path.unwrap_or_else(Cli::default_db_path);
    ensure_parent_dir(&db_path)?;
    let db_str = db_path.to_string_lossy();
    let pool = mizu_tasks::new_file(&db_str, &ConnectionConfig::default())
        .context("Failed to open database")?;
    {
        let conn = pool.get().context("Failed to get DB connection")?;
        mizu_tasks::run_migrations(&conn).context("Failed to run migrations")?;
    }
    tracing::info!(db = %db_path.display(), "database ready");

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    mizu_server::serve(&config, AppState::new(pool)).await
}
