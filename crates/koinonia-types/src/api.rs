use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    AttendanceStatus, MediaKind, PrayerStatus, Privacy, Visibility,
};

// -- JWT Claims --

/// Canonical claims definition lives here so the REST middleware and the
/// login/register handlers share one shape. The session carries the profile
/// metadata the dashboard needs without a user lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
}

// -- Dashboard --

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub circles: u64,
    pub testimonies: u64,
    pub prayers: u64,
    pub events: u64,
}

// -- People --

/// Display projection of an owning/authoring user, joined into list rows so
/// clients never need a second round trip for names.
#[derive(Debug, Clone, Serialize)]
pub struct PersonRef {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// -- Circles --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCircleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub privacy: Privacy,
    #[serde(default)]
    pub church_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCircleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub privacy: Privacy,
    #[serde(default)]
    pub church_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CircleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub privacy: Privacy,
    pub owner: PersonRef,
    pub church_name: Option<String>,
    pub member_count: u64,
    pub is_member: bool,
    pub is_owner: bool,
    pub created_at: DateTime<Utc>,
}

// -- Churches --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChurchPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub pastor_name: Option<String>,
    #[serde(default)]
    pub service_times: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChurchResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub pastor_name: Option<String>,
    pub service_times: Option<String>,
    pub created_by: PersonRef,
    pub created_at: DateTime<Utc>,
}

// -- Prayer requests --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePrayerRequest {
    pub title: String,
    pub content: String,
    pub is_public: bool,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub circle_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePrayerStatusRequest {
    pub status: PrayerStatus,
}

#[derive(Debug, Serialize)]
pub struct PrayerResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: PersonRef,
    pub is_public: bool,
    pub is_urgent: bool,
    pub status: PrayerStatus,
    pub circle_name: Option<String>,
    pub support_count: u64,
    pub supported_by_me: bool,
    pub created_at: DateTime<Utc>,
}

// -- Testimonies --

#[derive(Debug, Clone, Serialize)]
pub struct MediaItem {
    pub url: String,
    pub kind: MediaKind,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTestimonyRequest {
    pub title: String,
    pub content: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub circle_id: Option<Uuid>,
    /// Paths returned by POST /media; ownership is re-verified at creation.
    #[serde(default)]
    pub media_paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactionRequest {
    pub reaction_type: String,
}

#[derive(Debug, Serialize)]
pub struct ReactionGroup {
    pub reaction_type: String,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub author: PersonRef,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TestimonyResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: PersonRef,
    pub visibility: Visibility,
    pub circle_name: Option<String>,
    pub media: Vec<MediaItem>,
    pub reactions: Vec<ReactionGroup>,
    pub my_reaction: Option<String>,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
}

// -- Events --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub circle_id: Option<Uuid>,
    #[serde(default)]
    pub church_id: Option<Uuid>,
    #[serde(default)]
    pub max_attendees: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RsvpRequest {
    pub status: AttendanceStatus,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
    pub organizer: PersonRef,
    pub circle_name: Option<String>,
    pub church_name: Option<String>,
    pub max_attendees: Option<u32>,
    pub attending_count: u64,
    pub my_status: Option<AttendanceStatus>,
    pub created_at: DateTime<Utc>,
}

// -- Reading plans --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReadingPlanRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration_days: u32,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressRequest {
    pub day: u32,
}

#[derive(Debug, Serialize)]
pub struct ReadingPlanResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_days: u32,
    pub is_public: bool,
    pub created_by: PersonRef,
    pub assignment_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_count: Option<u64>,
    pub created_at: DateTime<Utc>,
}

// -- Media --

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: Uuid,
    pub path: String,
    pub kind: MediaKind,
    pub size: u64,
}
