/**
 * Upload Handlers
 *
 * - `POST /media/upload` - upload an image, returns its public URL
 * - `PATCH /users/me/avatar` - upload an image and set it as the
 *   authenticated user's avatar
 *
 * Only image content types are accepted; the check runs before anything
 * touches object storage so a bad upload fails fast.
 */
use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::auth::users::update_avatar_url;
use crate::error::ApiError;
use crate::media::storage::ObjectStorage;
use crate::middleware::auth::CurrentUser;
use crate::server::state::AppState;

/// A file pulled out of a multipart body.
struct UploadedFile {
    filename: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

/// Read the `file` field from a multipart body and require an image
/// content type.
async fn read_image_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();

        if !content_type.starts_with("image/") {
            return Err(ApiError::bad_request("file must be an image"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?
            .to_vec();

        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Err(ApiError::bad_request("missing 'file' field"))
}

/// Upload the file and return `(original filename, public url)`.
async fn store_file(
    state: &AppState,
    file: UploadedFile,
) -> Result<(Option<String>, String), ApiError> {
    let UploadedFile {
        filename,
        content_type,
        bytes,
    } = file;

    let storage = state.require_storage()?;
    let key = ObjectStorage::object_key(filename.as_deref());

    let url = storage
        .upload(&key, &content_type, bytes)
        .await
        .map_err(|_| ApiError::internal("failed to upload file"))?;

    Ok((filename, url))
}

/// Upload a standalone media file.
///
/// # Errors
///
/// * `400 Bad Request` - not an image, or malformed multipart body
/// * `503 Service Unavailable` - object storage not configured
/// * `500 Internal Server Error` - storage upload failed
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let file = read_image_field(&mut multipart).await?;
    let (filename, url) = store_file(&state, file).await?;

    Ok(Json(json!({
        "filename": filename,
        "url": url,
    })))
}

/// Upload an avatar for the authenticated user and record its URL.
///
/// # Errors
///
/// * `400 Bad Request` - not an image, or malformed multipart body
/// * `401 Unauthorized` - missing/invalid bearer token
/// * `503 Service Unavailable` - object storage or database not configured
pub async fn update_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let file = read_image_field(&mut multipart).await?;
    let (_, avatar_url) = store_file(&state, file).await?;

    let pool = state.require_db()?;
    update_avatar_url(pool, &user.username, &avatar_url).await?;

    tracing::info!("avatar updated for {}", user.username);

    Ok(Json(json!({
        "message": "avatar updated successfully",
        "avatar_url": avatar_url,
        "user": user.username,
    })))
}
