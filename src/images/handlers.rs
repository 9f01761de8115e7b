use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    images::services::{upload_reference, UploadItem},
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

pub fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST /upload (multipart, field `image`)
///
/// `AuthUser` runs before `Multipart`, so unauthenticated requests never touch the body.
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut mp = mp?;
    let mut item = None;
    while let Some(field) = mp.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = field.bytes().await?;
        item = Some(UploadItem {
            file_name,
            content_type,
            body,
        });
        break;
    }

    let item = item.ok_or_else(|| AppError::Validation("No file uploaded.".into()))?;
    let image_url = upload_reference(&state, &identity, item).await?;
    Ok(Json(UploadResponse { image_url }))
}
