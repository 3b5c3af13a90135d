use axum::{Json, extract::State, response::IntoResponse};

use koinonia_types::api::StatsResponse;

use crate::error::ApiResult;
use crate::{AppState, blocking};

/// One count query per entity type, issued concurrently and joined. A
/// failure in any branch fails the whole request — counts are never
/// silently reported as zero.
pub async fn stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let (circles, testimonies, prayers, events) = {
        let (c, t, p, e) = (state.clone(), state.clone(), state.clone(), state.clone());
        tokio::join!(
            blocking("loading circle count", move || c.db.count_circles()),
            blocking("loading testimony count", move || t.db.count_testimonies()),
            blocking("loading prayer count", move || p.db.count_prayers()),
            blocking("loading event count", move || e.db.count_events()),
        )
    };

    Ok(Json(StatsResponse {
        circles: circles? as u64,
        testimonies: testimonies? as u64,
        prayers: prayers? as u64,
        events: events? as u64,
    }))
}
