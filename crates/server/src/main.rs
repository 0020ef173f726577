use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use fieldbook_core::UserId;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let db_path = data_dir.join("fieldbook.db");
    let db = fieldbook_storage::create_db(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    fieldbook_storage::seed_default_categories(&db)
        .await
        .context("Failed to seed expense categories")?;

    let user = UserId(
        std::env::var("FIELDBOOK_USER_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1),
    );

    let addr: SocketAddr = std::env::var("FIELDBOOK_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8787".to_string())
        .parse()
        .context("Invalid FIELDBOOK_ADDR")?;

    let app = routes::router(AppState::new(db, user));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("FIELDBOOK_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let dirs = directories::ProjectDirs::from("com", "fieldbook", "Fieldbook")
        .context("Failed to resolve application data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
