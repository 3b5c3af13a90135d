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

use koinonia_db::models::CircleRow;
use koinonia_db::queries::like_pattern;
use koinonia_types::api::{Claims, CircleResponse, CreateCircleRequest, UpdateCircleRequest};
use koinonia_types::models::Privacy;

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, convert};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CircleScope {
    #[default]
    My,
    All,
}

#[derive(Debug, Deserialize)]
pub struct CircleListQuery {
    #[serde(default)]
    pub scope: CircleScope,
    #[serde(default)]
    pub q: String,
}

pub async fn list_circles(
    State(state): State<AppState>,
    Query(query): Query<CircleListQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let viewer = claims.sub.to_string();
    let pattern = like_pattern(&query.q);
    let scope = query.scope;

    let rows = blocking("loading circles", move || match scope {
        CircleScope::My => db.db.list_my_circles(&viewer, &pattern),
        CircleScope::All => db.db.list_public_circles(&viewer, &pattern),
    })
    .await?;

    let circles: Vec<CircleResponse> = rows
        .into_iter()
        .map(|row| circle_response(row, claims.sub))
        .collect();
    Ok(Json(circles))
}

pub async fn create_circle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCircleRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Circle name is required.".into()));
    }
    if let Some(church_id) = req.church_id {
        ensure_church_exists(&state, church_id).await?;
    }

    let id = Uuid::new_v4();
    let db = state.clone();
    let owner = claims.sub.to_string();
    blocking("creating circle", move || {
        db.db.create_circle(
            &id.to_string(),
            req.name.trim(),
            req.description.as_deref(),
            req.privacy.as_str(),
            &owner,
            req.church_id.map(|c| c.to_string()).as_deref(),
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_circle(
    State(state): State<AppState>,
    Path(circle_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateCircleRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Circle name is required.".into()));
    }
    ensure_owner(&state, circle_id, claims.sub).await?;
    if let Some(church_id) = req.church_id {
        ensure_church_exists(&state, church_id).await?;
    }

    let db = state.clone();
    blocking("updating circle", move || {
        db.db.update_circle(
            &circle_id.to_string(),
            req.name.trim(),
            req.description.as_deref(),
            req.privacy.as_str(),
            req.church_id.map(|c| c.to_string()).as_deref(),
        )
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_circle(
    State(state): State<AppState>,
    Path(circle_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    ensure_owner(&state, circle_id, claims.sub).await?;

    let db = state.clone();
    blocking("deleting circle", move || db.db.delete_circle(&circle_id.to_string())).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn join_circle(
    State(state): State<AppState>,
    Path(circle_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let exists = blocking("joining circle", move || db.db.circle_owner(&circle_id.to_string()))
        .await?
        .is_some();
    if !exists {
        return Err(ApiError::NotFound("Circle not found.".into()));
    }

    let db = state.clone();
    let user = claims.sub.to_string();
    blocking("joining circle", move || db.db.join_circle(&circle_id.to_string(), &user)).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn leave_circle(
    State(state): State<AppState>,
    Path(circle_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let user = claims.sub.to_string();
    blocking("leaving circle", move || db.db.leave_circle(&circle_id.to_string(), &user)).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Ownership is checked at the point of mutation, not merely hidden in a
/// client. 404 for unknown ids, 403 for everyone but the owner.
async fn ensure_owner(state: &AppState, circle_id: Uuid, user: Uuid) -> ApiResult<()> {
    let db = state.clone();
    let owner = blocking("checking circle owner", move || {
        db.db.circle_owner(&circle_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Circle not found.".into()))?;

    if owner != user.to_string() {
        return Err(ApiError::Forbidden("Only the circle owner can do that.".into()));
    }
    Ok(())
}

async fn ensure_church_exists(state: &AppState, church_id: Uuid) -> ApiResult<()> {
    let db = state.clone();
    let exists = blocking("checking church", move || db.db.church_exists(&church_id.to_string()))
        .await?;
    if !exists {
        return Err(ApiError::Validation("Unknown church.".into()));
    }
    Ok(())
}

fn circle_response(row: CircleRow, viewer: Uuid) -> CircleResponse {
    let is_owner = row.owner_id == viewer.to_string();
    CircleResponse {
        id: convert::parse_id(&row.id, "circle"),
        name: row.name,
        description: row.description,
        privacy: Privacy::from_str(&row.privacy).unwrap_or(Privacy::Private),
        owner: convert::person(&row.owner_id, &row.owner_first_name, &row.owner_last_name, None),
        church_name: row.church_name,
        member_count: row.member_count.max(0) as u64,
        is_member: row.is_member,
        is_owner,
        created_at: convert::parse_timestamp(&row.created_at, "circle"),
    }
}
