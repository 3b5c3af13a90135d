use std::str::FromStr;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use koinonia_db::models::PrayerRow;
use koinonia_types::api::{Claims, CreatePrayerRequest, PrayerResponse, UpdatePrayerStatusRequest};
use koinonia_types::models::PrayerStatus;

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, convert};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PrayerFilter {
    #[default]
    All,
    Active,
    Answered,
    Urgent,
}

#[derive(Debug, Deserialize)]
pub struct PrayerListQuery {
    #[serde(default)]
    pub filter: PrayerFilter,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

pub async fn list_prayers(
    State(state): State<AppState>,
    Query(query): Query<PrayerListQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let (status, urgent_only) = match query.filter {
        PrayerFilter::All => (None, false),
        PrayerFilter::Active => (Some(PrayerStatus::Active), false),
        PrayerFilter::Answered => (Some(PrayerStatus::Answered), false),
        PrayerFilter::Urgent => (None, true),
    };

    let db = state.clone();
    let viewer = claims.sub.to_string();
    let limit = query.limit.min(200);
    let rows = blocking("loading prayer requests", move || {
        db.db
            .list_prayers(&viewer, status.map(|s| s.as_str()), urgent_only, limit)
    })
    .await?;

    let prayers: Vec<PrayerResponse> = rows.into_iter().map(prayer_response).collect();
    Ok(Json(prayers))
}

pub async fn create_prayer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePrayerRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::Validation("Title and content are required.".into()));
    }

    // A circle-scoped request must name a circle the author belongs to.
    let circle_id = match (req.is_public, req.circle_id) {
        (true, _) => None,
        (false, None) => {
            return Err(ApiError::Validation(
                "Choose a circle for a circle-only prayer request.".into(),
            ));
        }
        (false, Some(circle_id)) => {
            let db = state.clone();
            let user = claims.sub.to_string();
            let member = blocking("checking circle membership", move || {
                db.db.is_circle_member(&circle_id.to_string(), &user)
            })
            .await?;
            if !member {
                return Err(ApiError::Forbidden(
                    "You can only share with circles you belong to.".into(),
                ));
            }
            Some(circle_id)
        }
    };

    let id = Uuid::new_v4();
    let db = state.clone();
    let author = claims.sub.to_string();
    blocking("creating prayer request", move || {
        db.db.create_prayer(
            &id.to_string(),
            req.title.trim(),
            req.content.trim(),
            &author,
            req.is_public,
            req.is_urgent,
            circle_id.map(|c| c.to_string()).as_deref(),
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_prayer_status(
    State(state): State<AppState>,
    Path(prayer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePrayerStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    ensure_author(&state, prayer_id, claims.sub).await?;

    let db = state.clone();
    blocking("updating prayer status", move || {
        db.db.set_prayer_status(&prayer_id.to_string(), req.status.as_str())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_prayer(
    State(state): State<AppState>,
    Path(prayer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    ensure_author(&state, prayer_id, claims.sub).await?;

    let db = state.clone();
    blocking("deleting prayer request", move || {
        db.db.delete_prayer(&prayer_id.to_string())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Idempotent: supporting a prayer you already support is a no-op.
pub async fn support_prayer(
    State(state): State<AppState>,
    Path(prayer_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let exists = blocking("supporting prayer", move || {
        db.db.prayer_author(&prayer_id.to_string())
    })
    .await?
    .is_some();
    if !exists {
        return Err(ApiError::NotFound("Prayer request not found.".into()));
    }

    let db = state.clone();
    let user = claims.sub.to_string();
    blocking("supporting prayer", move || {
        db.db.support_prayer(&prayer_id.to_string(), &user)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_author(state: &AppState, prayer_id: Uuid, user: Uuid) -> ApiResult<()> {
    let db = state.clone();
    let author = blocking("checking prayer author", move || {
        db.db.prayer_author(&prayer_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Prayer request not found.".into()))?;

    if author != user.to_string() {
        return Err(ApiError::Forbidden(
            "Only the author can change this prayer request.".into(),
        ));
    }
    Ok(())
}

fn prayer_response(row: PrayerRow) -> PrayerResponse {
    PrayerResponse {
        id: convert::parse_id(&row.id, "prayer request"),
        title: row.title,
        content: row.content,
        author: convert::person(
            &row.author_id,
            &row.author_first_name,
            &row.author_last_name,
            row.author_avatar_url,
        ),
        is_public: row.is_public,
        is_urgent: row.is_urgent,
        status: PrayerStatus::from_str(&row.status).unwrap_or(PrayerStatus::Active),
        circle_name: row.circle_name,
        support_count: row.support_count.max(0) as u64,
        supported_by_me: row.supported_by_me,
        created_at: convert::parse_timestamp(&row.created_at, "prayer request"),
    }
}
