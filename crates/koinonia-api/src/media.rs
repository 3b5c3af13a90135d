use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use koinonia_types::api::{Claims, UploadResponse};
use koinonia_types::models::MediaKind;

use crate::error::{ApiError, ApiResult};
use crate::{AppState, blocking};

/// 10 MB upload limit for media attachments
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// POST /media — accepts raw bytes, saves under
/// `{uploads_dir}/{user_id}/{millis}-{id}`, records ownership, returns the
/// stored path for a later testimony creation to reference. The media kind
/// is inferred from the Content-Type prefix.
pub async fn upload(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    bytes: Bytes,
) -> ApiResult<impl IntoResponse> {
    if bytes.is_empty() {
        return Err(ApiError::Validation("Choose a file to upload.".into()));
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(ApiError::Upload("File is too large (10 MB limit).".into()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let kind = MediaKind::from_content_type(&content_type);

    let id = Uuid::new_v4();
    let size = bytes.len() as i64;
    let rel_path = format!(
        "{}/{}-{}",
        claims.sub,
        chrono::Utc::now().timestamp_millis(),
        id
    );

    let user_dir = state.uploads_dir.join(claims.sub.to_string());
    tokio::fs::create_dir_all(&user_dir)
        .await
        .map_err(|e| ApiError::store("uploading file")(e.into()))?;

    let file_path = state.uploads_dir.join(&rel_path);
    let mut file = tokio::fs::File::create(&file_path)
        .await
        .map_err(|e| ApiError::store("uploading file")(e.into()))?;
    file.write_all(&bytes)
        .await
        .map_err(|e| ApiError::store("uploading file")(e.into()))?;

    // Record ownership; if this fails the blob stays orphaned on disk,
    // which is a known leak rather than a data-integrity risk.
    let db = state.clone();
    let (mid, owner, path, ct) = (
        id.to_string(),
        claims.sub.to_string(),
        rel_path.clone(),
        content_type,
    );
    blocking("uploading file", move || {
        db.db.insert_media(&mid, &owner, &path, kind.as_str(), &ct, size)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id,
            path: rel_path,
            kind,
            size: size as u64,
        }),
    ))
}

/// GET /media/{id} — streams the stored blob back with its recorded
/// content type. The id is a UUID, which also rules out path traversal.
pub async fn download(
    State(state): State<AppState>,
    Path(media_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let row = blocking("loading file", move || db.db.get_media(&media_id.to_string()))
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found.".into()))?;

    let file_path = state.uploads_dir.join(&row.path);
    let bytes = tokio::fs::read(&file_path).await.map_err(|e| {
        tracing::error!("Missing media blob {} for id {}: {}", row.path, row.id, e);
        ApiError::NotFound("File not found.".into())
    })?;

    Ok(([(header::CONTENT_TYPE, row.content_type)], bytes))
}
