use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::claims::Identity;
use crate::error::AppError;
use crate::state::AppState;

pub struct UploadItem {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

const ALLOWED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "heic"];

/// Stores the image and returns its public path. `identity` is required so the
/// caller must have passed the auth gate before any bytes are handled.
pub async fn upload_reference(
    st: &AppState,
    identity: &Identity,
    item: UploadItem,
) -> Result<String, AppError> {
    let ext = image_extension(item.file_name.as_deref(), item.content_type.as_deref())
        .ok_or_else(|| {
            warn!(email = %identity.email, file_name = ?item.file_name, "disallowed upload type");
            AppError::Validation("Only image files are allowed.".into())
        })?;
    if item.body.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty.".into()));
    }

    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let key = format!("{}-{}.{}", millis, Uuid::new_v4(), ext);
    let content_type = item.content_type.as_deref().unwrap_or("application/octet-stream");

    st.uploads
        .put_object(&key, item.body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))
        .map_err(|e| AppError::Internal(format!("{e:#}")))?;

    let url = st.uploads.public_url(&key);
    info!(email = %identity.email, %url, "image uploaded");
    Ok(url)
}

/// Extension from the file name if it has one, otherwise from the content type.
fn image_extension(file_name: Option<&str>, content_type: Option<&str>) -> Option<&'static str> {
    let from_name = file_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match from_name {
        Some(ext) => ALLOWED_EXTENSIONS.iter().copied().find(|a| *a == ext),
        None => content_type.and_then(ext_from_mime),
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod image_tests {
    use super::*;

    fn who() -> Identity {
        Identity {
            email: "a@x.com".into(),
        }
    }

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
        assert_eq!(ext_from_mime("whatever/else"), None);
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension(Some("Me.JPG"), None), Some("jpg"));
        assert_eq!(image_extension(Some("front.jpeg"), Some("text/plain")), Some("jpeg"));
        assert_eq!(image_extension(Some("notes.txt"), Some("image/png")), None);
        assert_eq!(image_extension(Some("evil.png.exe"), None), None);
        assert_eq!(image_extension(Some("blob"), Some("image/png")), Some("png"));
        assert_eq!(image_extension(None, None), None);
    }

    #[tokio::test]
    async fn upload_returns_uploads_path() {
        let state = AppState::fake();
        let url = upload_reference(
            &state,
            &who(),
            UploadItem {
                file_name: Some("side.png".into()),
                content_type: Some("image/png".into()),
                body: Bytes::from_static(b"\x89PNG"),
            },
        )
        .await
        .unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));
        assert!(!url.contains("side"));
    }

    #[tokio::test]
    async fn upload_rejects_disallowed_type() {
        let state = AppState::fake();
        let err = upload_reference(
            &state,
            &who(),
            UploadItem {
                file_name: Some("script.sh".into()),
                content_type: Some("text/x-sh".into()),
                body: Bytes::from_static(b"#!/bin/sh"),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn upload_rejects_empty_body() {
        let state = AppState::fake();
        let err = upload_reference(
            &state,
            &who(),
            UploadItem {
                file_name: Some("x.png".into()),
                content_type: None,
                body: Bytes::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
