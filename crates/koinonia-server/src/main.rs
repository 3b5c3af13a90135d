use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use koinonia_api::{AppState, AppStateInner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "koinonia=debug,tower_http=debug".into()),
        )
        .init();

    // Config. The signing secret has no default on purpose: a forgotten env
    // var must fail the boot, not silently issue forgeable sessions.
    let jwt_secret = std::env::var("KOINONIA_JWT_SECRET")
        .context("KOINONIA_JWT_SECRET must be set (no built-in default)")?;
    let db_path = std::env::var("KOINONIA_DB_PATH").unwrap_or_else(|_| "koinonia.db".into());
    let uploads_dir =
        std::env::var("KOINONIA_UPLOADS_DIR").unwrap_or_else(|_| "uploads".into());
    let host = std::env::var("KOINONIA_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("KOINONIA_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .context("KOINONIA_PORT must be a port number")?;

    // Init database and upload storage
    let db = koinonia_db::Database::open(&PathBuf::from(&db_path))?;
    let uploads_dir = PathBuf::from(uploads_dir);
    tokio::fs::create_dir_all(&uploads_dir)
        .await
        .with_context(|| format!("creating uploads dir {}", uploads_dir.display()))?;

    let state: AppState = Arc::new(AppStateInner { db, jwt_secret, uploads_dir });

    let app = koinonia_api::router::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Koinonia server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
