/// Database row types — these map directly to SQLite rows.
/// Distinct from koinonia-types API models to keep the DB layer independent
/// of the wire format; ids and timestamps stay strings until the API
/// boundary parses them.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

pub struct CircleRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub privacy: String,
    pub owner_id: String,
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub church_name: Option<String>,
    pub member_count: i64,
    pub is_member: bool,
    pub created_at: String,
}

pub struct ChurchRow {
    pub id: String,
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
    pub created_by: String,
    pub creator_first_name: String,
    pub creator_last_name: String,
    pub created_at: String,
}

pub struct PrayerRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_avatar_url: Option<String>,
    pub is_public: bool,
    pub is_urgent: bool,
    pub status: String,
    pub circle_name: Option<String>,
    pub support_count: i64,
    pub supported_by_me: bool,
    pub created_at: String,
}

pub struct TestimonyRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_avatar_url: Option<String>,
    pub visibility: String,
    pub circle_name: Option<String>,
    /// JSON arrays of equal length, exactly as the entity was created.
    pub media_urls: String,
    pub media_types: String,
    pub created_at: String,
}

pub struct ReactionRow {
    pub testimony_id: String,
    pub user_id: String,
    pub reaction_type: String,
}

pub struct CommentRow {
    pub id: String,
    pub testimony_id: String,
    pub author_id: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub content: String,
    pub created_at: String,
}

pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub event_date: String,
    pub location: Option<String>,
    pub organizer_id: String,
    pub organizer_first_name: String,
    pub organizer_last_name: String,
    pub organizer_avatar_url: Option<String>,
    pub circle_name: Option<String>,
    pub church_name: Option<String>,
    pub max_attendees: Option<i64>,
    pub attending_count: i64,
    pub my_status: Option<String>,
    pub created_at: String,
}

pub struct ReadingPlanRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_days: i64,
    pub is_public: bool,
    pub created_by: String,
    pub creator_first_name: String,
    pub creator_last_name: String,
    pub assignment_count: i64,
    pub start_date: Option<String>,
    pub progress_count: Option<i64>,
    pub created_at: String,
}

pub struct MediaRow {
    pub id: String,
    pub owner_id: String,
    pub path: String,
    pub kind: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: String,
}
