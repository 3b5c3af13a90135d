use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use koinonia_db::models::ChurchRow;
use koinonia_db::queries::like_pattern;
use koinonia_types::api::{ChurchPayload, ChurchResponse, Claims};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, convert};

#[derive(Debug, Deserialize)]
pub struct ChurchListQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn list_churches(
    State(state): State<AppState>,
    Query(query): Query<ChurchListQuery>,
    Extension(_claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let pattern = like_pattern(&query.q);
    let rows = blocking("loading churches", move || db.db.list_churches(&pattern)).await?;

    let churches: Vec<ChurchResponse> = rows.into_iter().map(church_response).collect();
    Ok(Json(churches))
}

pub async fn create_church(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChurchPayload>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Church name is required.".into()));
    }

    let id = Uuid::new_v4();
    let db = state.clone();
    let creator = claims.sub.to_string();
    blocking("creating church", move || {
        db.db.create_church(&id.to_string(), &req, &creator)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_church(
    State(state): State<AppState>,
    Path(church_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChurchPayload>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Church name is required.".into()));
    }
    ensure_creator(&state, church_id, claims.sub).await?;

    let db = state.clone();
    blocking("updating church", move || db.db.update_church(&church_id.to_string(), &req))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_church(
    State(state): State<AppState>,
    Path(church_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    ensure_creator(&state, church_id, claims.sub).await?;

    let db = state.clone();
    blocking("deleting church", move || db.db.delete_church(&church_id.to_string())).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_creator(state: &AppState, church_id: Uuid, user: Uuid) -> ApiResult<()> {
    let db = state.clone();
    let creator = blocking("checking church", move || {
        db.db.church_creator(&church_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Church not found.".into()))?;

    if creator != user.to_string() {
        return Err(ApiError::Forbidden(
            "Only the person who added this church can change it.".into(),
        ));
    }
    Ok(())
}

fn church_response(row: ChurchRow) -> ChurchResponse {
    ChurchResponse {
        id: convert::parse_id(&row.id, "church"),
        name: row.name,
        description: row.description,
        address: row.address,
        city: row.city,
        state: row.state,
        zip_code: row.zip_code,
        phone: row.phone,
        email: row.email,
        website: row.website,
        pastor_name: row.pastor_name,
        service_times: row.service_times,
        created_by: convert::person(
            &row.created_by,
            &row.creator_first_name,
            &row.creator_last_name,
            None,
        ),
        created_at: convert::parse_timestamp(&row.created_at, "church"),
    }
}
