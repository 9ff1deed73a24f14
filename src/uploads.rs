use std::path::{Path, PathBuf};

use axum::body::Bytes;
use uuid::Uuid;

use crate::utils::error::AppError;

pub const DEFAULT_MAX_THUMBNAIL_BYTES: usize = 5 << 20;

/// Public URL prefix under which saved thumbnails are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Room for the other form fields and multipart framing.
const FORM_OVERHEAD_BYTES: usize = 1 << 20;

const FALLBACK_EXTENSION: &str = "img";

/// An image file part taken from a multipart form.
#[derive(Debug, Clone)]
pub struct ThumbnailUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct ThumbnailStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ThumbnailStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Request body limit for routes that accept a thumbnail.
    pub fn body_limit(&self) -> usize {
        self.max_bytes + FORM_OVERHEAD_BYTES
    }

    pub fn validate(&self, upload: &ThumbnailUpload) -> Result<(), AppError> {
        if upload.bytes.len() > self.max_bytes {
            return Err(AppError::ValidationError(format!(
                "Thumbnail too large (max {}MB)",
                self.max_bytes >> 20
            )));
        }

        let is_image = match upload.content_type.as_deref().map(str::trim) {
            Some(ct) if !ct.is_empty() => ct.to_ascii_lowercase().starts_with("image/"),
            _ => upload
                .file_name
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
                .unwrap_or(false),
        };
        if !is_image {
            return Err(AppError::ValidationError(
                "Thumbnail must be an image".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates and writes the file under a random name, returning its
    /// public path (`/uploads/<name>`).
    pub async fn save(&self, upload: ThumbnailUpload) -> Result<String, AppError> {
        self.validate(&upload)?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = format!(
            "{}.{}",
            Uuid::new_v4().simple(),
            extension_of(upload.file_name.as_deref())
        );
        tokio::fs::write(self.dir.join(&filename), &upload.bytes).await?;

        tracing::info!(file = %filename, size = upload.bytes.len(), "Thumbnail stored");
        Ok(format!("{UPLOADS_ROUTE}/{filename}"))
    }

    /// Removes a file written by [`save`](Self::save) that ended up unreferenced.
    pub async fn discard(&self, public_path: &str) {
        let Some(filename) = public_path
            .strip_prefix(UPLOADS_ROUTE)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
        else {
            tracing::warn!(path = %public_path, "Not a stored thumbnail path");
            return;
        };

        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => tracing::info!(file = %filename, "Orphaned thumbnail removed"),
            Err(e) => tracing::warn!(file = %filename, error = %e, "Failed to remove thumbnail"),
        }
    }
}

fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
