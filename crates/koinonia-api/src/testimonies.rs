use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use koinonia_db::models::{CommentRow, ReactionRow, TestimonyRow};
use koinonia_types::api::{
    Claims, CommentResponse, CreateCommentRequest, CreateTestimonyRequest, MediaItem,
    ReactionGroup, ReactionRequest, TestimonyResponse,
};
use koinonia_types::models::{MediaKind, Visibility};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking, convert};

/// Max attachments per testimony, matching the upload form's cap.
const MAX_MEDIA: usize = 5;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TestimonyFilter {
    #[default]
    All,
    Public,
    Circle,
    Private,
}

impl TestimonyFilter {
    fn visibility(self) -> Option<Visibility> {
        match self {
            Self::All => None,
            Self::Public => Some(Visibility::Public),
            Self::Circle => Some(Visibility::Circle),
            Self::Private => Some(Visibility::Private),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TestimonyListQuery {
    /// Narrow to one visibility tier; `all` means everything the viewer can see.
    #[serde(default)]
    pub filter: TestimonyFilter,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Cursor-based pagination — pass the `created_at` of the oldest
    /// testimony from the previous page to fetch older ones.
    #[serde(default)]
    pub before: Option<String>,
}

fn default_limit() -> u32 {
    20
}

pub async fn list_testimonies(
    State(state): State<AppState>,
    Query(query): Query<TestimonyListQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let viewer = claims.sub.to_string();
    let limit = query.limit.min(100);
    let filter = query.filter.visibility();
    let before = query.before.clone();

    let (rows, reaction_rows, comment_rows) = blocking("loading testimonies", move || {
        let rows = db.db.list_testimonies(
            &viewer,
            filter.map(|v| v.as_str()),
            limit,
            before.as_deref(),
        )?;
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let reactions = db.db.get_reactions_for(&ids)?;
        let comments = db.db.get_comments_for(&ids)?;
        Ok((rows, reactions, comments))
    })
    .await?;

    // Group reactions and comments by testimony (cheap in-memory work)
    let mut reactions_by_id: HashMap<String, Vec<ReactionRow>> = HashMap::new();
    for r in reaction_rows {
        reactions_by_id.entry(r.testimony_id.clone()).or_default().push(r);
    }
    let mut comments_by_id: HashMap<String, Vec<CommentRow>> = HashMap::new();
    for c in comment_rows {
        comments_by_id.entry(c.testimony_id.clone()).or_default().push(c);
    }

    let viewer = claims.sub.to_string();
    let testimonies: Vec<TestimonyResponse> = rows
        .into_iter()
        .map(|row| {
            let reactions = reactions_by_id.remove(&row.id).unwrap_or_default();
            let comments = comments_by_id.remove(&row.id).unwrap_or_default();
            testimony_response(row, reactions, comments, &viewer)
        })
        .collect();

    Ok(Json(testimonies))
}

/// All-or-nothing creation: every referenced media path must be an upload
/// owned by the requester, verified before the row is written. On any
/// missing path nothing is written; already-stored blobs stay orphaned (a
/// known leak, not a data-integrity risk).
pub async fn create_testimony(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTestimonyRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::Validation("Title and content are required.".into()));
    }
    if req.media_paths.len() > MAX_MEDIA {
        return Err(ApiError::Validation(format!(
            "A testimony can have at most {} attachments.",
            MAX_MEDIA
        )));
    }

    let circle_id = match (req.visibility, req.circle_id) {
        (Visibility::Circle, None) => {
            return Err(ApiError::Validation(
                "Choose a circle for a circle-only testimony.".into(),
            ));
        }
        (Visibility::Circle, Some(circle_id)) => {
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
        _ => None,
    };

    let kinds = if req.media_paths.is_empty() {
        vec![]
    } else {
        let db = state.clone();
        let owner = claims.sub.to_string();
        let paths = req.media_paths.clone();
        blocking("verifying attachments", move || db.db.media_kinds_owned(&owner, &paths))
            .await?
            .ok_or_else(|| {
                ApiError::Upload(
                    "One or more attachments were not found. Re-upload and try again.".into(),
                )
            })?
    };

    let id = Uuid::new_v4();
    let media_urls = serde_json::to_string(&req.media_paths)
        .map_err(|e| ApiError::store("creating testimony")(e.into()))?;
    let media_types = serde_json::to_string(&kinds)
        .map_err(|e| ApiError::store("creating testimony")(e.into()))?;

    let db = state.clone();
    let author = claims.sub.to_string();
    blocking("creating testimony", move || {
        db.db.create_testimony(
            &id.to_string(),
            req.title.trim(),
            req.content.trim(),
            &author,
            req.visibility.as_str(),
            circle_id.map(|c| c.to_string()).as_deref(),
            &media_urls,
            &media_types,
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn delete_testimony(
    State(state): State<AppState>,
    Path(testimony_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let author = blocking("checking testimony author", move || {
        db.db.testimony_author(&testimony_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("Testimony not found.".into()))?;

    if author != claims.sub.to_string() {
        return Err(ApiError::Forbidden("Only the author can delete this testimony.".into()));
    }

    let db = state.clone();
    blocking("deleting testimony", move || {
        db.db.delete_testimony(&testimony_id.to_string())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// One reaction per (testimony, user); reacting again overwrites.
pub async fn react(
    State(state): State<AppState>,
    Path(testimony_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReactionRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.reaction_type.trim().is_empty() {
        return Err(ApiError::Validation("Reaction type is required.".into()));
    }
    ensure_exists(&state, testimony_id).await?;

    let db = state.clone();
    let user = claims.sub.to_string();
    blocking("saving reaction", move || {
        db.db.set_reaction(&testimony_id.to_string(), &user, req.reaction_type.trim())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(testimony_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("Comment text is required.".into()));
    }
    ensure_exists(&state, testimony_id).await?;

    let id = Uuid::new_v4();
    let db = state.clone();
    let author = claims.sub.to_string();
    blocking("adding comment", move || {
        db.db
            .add_comment(&id.to_string(), &testimony_id.to_string(), &author, req.content.trim())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn ensure_exists(state: &AppState, testimony_id: Uuid) -> ApiResult<()> {
    let db = state.clone();
    let exists = blocking("checking testimony", move || {
        db.db.testimony_author(&testimony_id.to_string())
    })
    .await?
    .is_some();
    if !exists {
        return Err(ApiError::NotFound("Testimony not found.".into()));
    }
    Ok(())
}

fn testimony_response(
    row: TestimonyRow,
    reactions: Vec<ReactionRow>,
    comments: Vec<CommentRow>,
    viewer: &str,
) -> TestimonyResponse {
    let media = parse_media(&row);

    let mut my_reaction = None;
    let mut counts: HashMap<String, u64> = HashMap::new();
    for r in reactions {
        if r.user_id == viewer {
            my_reaction = Some(r.reaction_type.clone());
        }
        *counts.entry(r.reaction_type).or_default() += 1;
    }
    let mut groups: Vec<ReactionGroup> = counts
        .into_iter()
        .map(|(reaction_type, count)| ReactionGroup { reaction_type, count })
        .collect();
    groups.sort_by(|a, b| a.reaction_type.cmp(&b.reaction_type));

    let comments = comments
        .into_iter()
        .map(|c| CommentResponse {
            id: convert::parse_id(&c.id, "comment"),
            content: c.content,
            author: convert::person(&c.author_id, &c.author_first_name, &c.author_last_name, None),
            created_at: convert::parse_timestamp(&c.created_at, "comment"),
        })
        .collect();

    TestimonyResponse {
        id: convert::parse_id(&row.id, "testimony"),
        title: row.title,
        content: row.content,
        author: convert::person(
            &row.author_id,
            &row.author_first_name,
            &row.author_last_name,
            row.author_avatar_url,
        ),
        visibility: Visibility::from_str(&row.visibility).unwrap_or(Visibility::Private),
        circle_name: row.circle_name,
        media,
        reactions: groups,
        my_reaction,
        comments,
        created_at: convert::parse_timestamp(&row.created_at, "testimony"),
    }
}

/// Zip the stored url/kind arrays back into media items; both were written
/// together at creation, so a mismatch means a corrupt row.
fn parse_media(row: &TestimonyRow) -> Vec<MediaItem> {
    let urls: Vec<String> = serde_json::from_str(&row.media_urls).unwrap_or_else(|e| {
        warn!("Corrupt media_urls on testimony '{}': {}", row.id, e);
        vec![]
    });
    let kinds: Vec<String> = serde_json::from_str(&row.media_types).unwrap_or_else(|e| {
        warn!("Corrupt media_types on testimony '{}': {}", row.id, e);
        vec![]
    });
    if urls.len() != kinds.len() {
        warn!("Mismatched media arrays on testimony '{}'", row.id);
    }

    urls.into_iter()
        .zip(kinds)
        .map(|(url, kind)| MediaItem {
            url,
            kind: MediaKind::from_str(&kind).unwrap_or(MediaKind::Other),
        })
        .collect()
}
