use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use koinonia_db::models::ReadingPlanRow;
use koinonia_types::api::{Claims, CreateReadingPlanRequest, ProgressRequest, ReadingPlanResponse};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, convert};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PlanScope {
    #[default]
    All,
    My,
}

#[derive(Debug, Deserialize)]
pub struct PlanListQuery {
    #[serde(default)]
    pub scope: PlanScope,
}

pub async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<PlanListQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let viewer = claims.sub.to_string();
    let scope = query.scope;

    let rows = blocking("loading reading plans", move || match scope {
        PlanScope::All => db.db.list_public_plans(),
        PlanScope::My => db.db.list_my_plans(&viewer),
    })
    .await?;

    let plans: Vec<ReadingPlanResponse> = rows.into_iter().map(plan_response).collect();
    Ok(Json(plans))
}

pub async fn create_plan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReadingPlanRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Plan name is required.".into()));
    }
    if req.duration_days == 0 {
        return Err(ApiError::Validation("Plan duration must be at least one day.".into()));
    }

    let id = Uuid::new_v4();
    let db = state.clone();
    let creator = claims.sub.to_string();
    blocking("creating reading plan", move || {
        db.db.create_reading_plan(
            &id.to_string(),
            req.name.trim(),
            req.description.as_deref(),
            req.duration_days,
            req.is_public,
            &creator,
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let creator = blocking("checking reading plan", move || {
        db.db.reading_plan_creator(&plan_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Reading plan not found.".into()))?;

    if creator != claims.sub.to_string() {
        return Err(ApiError::Forbidden("Only the creator can delete this plan.".into()));
    }

    let db = state.clone();
    blocking("deleting reading plan", move || {
        db.db.delete_reading_plan(&plan_id.to_string())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Idempotent join; a second join keeps the original start date.
pub async fn join_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let exists = blocking("joining reading plan", move || {
        db.db.reading_plan_creator(&plan_id.to_string())
    })
    .await?
    .is_some();
    if !exists {
        return Err(ApiError::NotFound("Reading plan not found.".into()));
    }

    let assignment_id = Uuid::new_v4();
    let start_date = chrono::Utc::now().date_naive().to_string();
    let db = state.clone();
    let user = claims.sub.to_string();
    blocking("joining reading plan", move || {
        db.db
            .join_reading_plan(&assignment_id.to_string(), &plan_id.to_string(), &user, &start_date)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Mark a day of the plan complete; each day counts once.
pub async fn record_progress(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProgressRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let duration = blocking("checking reading plan", move || {
        db.db.reading_plan_duration(&plan_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Reading plan not found.".into()))?;

    if req.day == 0 || i64::from(req.day) > duration {
        return Err(ApiError::Validation(format!(
            "Day must be between 1 and {}.",
            duration
        )));
    }

    let db = state.clone();
    let user = claims.sub.to_string();
    let count = blocking("recording progress", move || {
        db.db.record_reading_progress(&plan_id.to_string(), &user, req.day)
    })
    .await?
    .ok_or_else(|| ApiError::Validation("Join this plan before recording progress.".into()))?;

    Ok(Json(json!({ "progress_count": count })))
}

fn plan_response(row: ReadingPlanRow) -> ReadingPlanResponse {
    let start_date = row.start_date.as_deref().and_then(|raw| {
        raw.parse::<NaiveDate>()
            .map_err(|e| warn!("Corrupt start_date '{}' on plan '{}': {}", raw, row.id, e))
            .ok()
    });

    ReadingPlanResponse {
        id: convert::parse_id(&row.id, "reading plan"),
        name: row.name,
        description: row.description,
        duration_days: row.duration_days.max(0) as u32,
        is_public: row.is_public,
        created_by: convert::person(
            &row.created_by,
            &row.creator_first_name,
            &row.creator_last_name,
            None,
        ),
        assignment_count: row.assignment_count.max(0) as u64,
        start_date,
        progress_count: row.progress_count.map(|c| c.max(0) as u64),
        created_at: convert::parse_timestamp(&row.created_at, "reading plan"),
    }
}
