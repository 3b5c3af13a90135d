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

use koinonia_db::models::EventRow;
use koinonia_db::queries::events::RsvpOutcome;
use koinonia_types::api::{Claims, EventPayload, EventResponse, RsvpRequest};
use koinonia_types::models::AttendanceStatus;

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, convert};

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    #[default]
    Upcoming,
    Past,
    Mine,
}

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub filter: EventFilter,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let viewer = claims.sub.to_string();
    let limit = query.limit.min(200);
    let now = chrono::Utc::now().to_rfc3339();
    let filter = query.filter;

    let rows = blocking("loading events", move || match filter {
        EventFilter::Upcoming => db.db.list_upcoming_events(&viewer, &now, limit),
        EventFilter::Past => db.db.list_past_events(&viewer, &now, limit),
        EventFilter::Mine => db.db.list_my_events(&viewer, limit),
    })
    .await?;

    let events: Vec<EventResponse> = rows.into_iter().map(event_response).collect();
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<EventPayload>,
) -> ApiResult<impl IntoResponse> {
    validate_payload(&req)?;

    let id = Uuid::new_v4();
    let db = state.clone();
    let organizer = claims.sub.to_string();
    blocking("creating event", move || {
        db.db.create_event(
            &id.to_string(),
            req.title.trim(),
            req.description.as_deref(),
            &req.event_date.to_rfc3339(),
            req.location.as_deref(),
            &organizer,
            req.circle_id.map(|c| c.to_string()).as_deref(),
            req.church_id.map(|c| c.to_string()).as_deref(),
            req.max_attendees,
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<EventPayload>,
) -> ApiResult<impl IntoResponse> {
    validate_payload(&req)?;
    ensure_organizer(&state, event_id, claims.sub).await?;

    let db = state.clone();
    blocking("updating event", move || {
        db.db.update_event(
            &event_id.to_string(),
            req.title.trim(),
            req.description.as_deref(),
            &req.event_date.to_rfc3339(),
            req.location.as_deref(),
            req.circle_id.map(|c| c.to_string()).as_deref(),
            req.church_id.map(|c| c.to_string()).as_deref(),
            req.max_attendees,
        )
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    ensure_organizer(&state, event_id, claims.sub).await?;

    let db = state.clone();
    blocking("deleting event", move || db.db.delete_event(&event_id.to_string())).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Tri-state RSVP upsert; the latest status wins. Attending is refused when
/// the event is at its attendee cap.
pub async fn rsvp(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RsvpRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let exists = blocking("checking event", move || db.db.event_organizer(&event_id.to_string()))
        .await?
        .is_some();
    if !exists {
        return Err(ApiError::NotFound("Event not found.".into()));
    }

    let db = state.clone();
    let user = claims.sub.to_string();
    let outcome = blocking("saving RSVP", move || {
        db.db.rsvp(&event_id.to_string(), &user, req.status.as_str())
    })
    .await?;

    match outcome {
        RsvpOutcome::Accepted => Ok(StatusCode::NO_CONTENT),
        RsvpOutcome::AtCapacity => Err(ApiError::Conflict("This event is full.".into())),
    }
}

fn validate_payload(req: &EventPayload) -> ApiResult<()> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Event title is required.".into()));
    }
    if req.max_attendees == Some(0) {
        return Err(ApiError::Validation("Attendee cap must be at least 1.".into()));
    }
    Ok(())
}

async fn ensure_organizer(state: &AppState, event_id: Uuid, user: Uuid) -> ApiResult<()> {
    let db = state.clone();
    let organizer = blocking("checking event organizer", move || {
        db.db.event_organizer(&event_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Event not found.".into()))?;

    if organizer != user.to_string() {
        return Err(ApiError::Forbidden("Only the organizer can change this event.".into()));
    }
    Ok(())
}

fn event_response(row: EventRow) -> EventResponse {
    EventResponse {
        id: convert::parse_id(&row.id, "event"),
        title: row.title,
        description: row.description,
        event_date: convert::parse_timestamp(&row.event_date, "event"),
        location: row.location,
        organizer: convert::person(
            &row.organizer_id,
            &row.organizer_first_name,
            &row.organizer_last_name,
            row.organizer_avatar_url,
        ),
        circle_name: row.circle_name,
        church_name: row.church_name,
        max_attendees: row.max_attendees.map(|m| m.max(0) as u32),
        attending_count: row.attending_count.max(0) as u64,
        my_status: row
            .my_status
            .as_deref()
            .and_then(|s| AttendanceStatus::from_str(s).ok()),
        created_at: convert::parse_timestamp(&row.created_at, "event"),
    }
}
