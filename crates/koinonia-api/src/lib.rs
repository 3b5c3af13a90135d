pub mod auth;
pub mod churches;
pub mod circles;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod media;
pub mod middleware;
pub mod prayers;
pub mod reading;
pub mod router;
pub mod testimonies;

use std::path::PathBuf;
use std::sync::Arc;

use error::{ApiError, ApiResult};
use koinonia_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub uploads_dir: PathBuf,
}

/// Run blocking DB work off the async runtime; both the join error and the
/// store error carry `context` into the user-visible message.
pub(crate) async fn blocking<T, F>(context: &'static str, f: F) -> ApiResult<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::store(context)(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
        .map_err(ApiError::store(context))
}
