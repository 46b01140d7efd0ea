use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::files::models::File;

/// Upload form DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// A stored file as returned by the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: i64,
    /// Original filename as uploaded
    pub name: String,
    /// MIME type reported at upload time
    #[serde(rename = "type")]
    pub file_type: String,
    /// Size of the file in bytes
    pub size: i64,
    /// Public URL of the stored blob
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<File> for FileResponseDto {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            name: file.name,
            file_type: file.file_type,
            size: file.size,
            url: file.url.unwrap_or_default(),
            uploaded_at: file.uploaded_at,
        }
    }
}

/// File content received from the upload form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A fully buffered blob ready to be sent to the client
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Content type used when the client did not report one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
