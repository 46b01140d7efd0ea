use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::AppPath;
use crate::features::files::dtos::{
    FileResponseDto, UploadFileDto, UploadedFile, DEFAULT_CONTENT_TYPE,
};
use crate::features::files::routes::UploadLimit;
use crate::features::files::services::FileService;
use crate::shared::types::ErrorResponseDto;

/// Where the browser lands after a successful upload
pub const GALLERY_PATH: &str = "/gallery";

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// `Content-Disposition` forcing a download under the original name.
///
/// Characters that cannot appear in a quoted ASCII filename are replaced in
/// `filename`; the exact name is then carried in `filename*` (RFC 5987).
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if fallback == name {
        format!("attachment; filename=\"{}\"", name)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(name)
        )
    }
}

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` field, stores it and
/// redirects the browser to the gallery.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Upload form with a single `file` field",
    ),
    responses(
        (status = 302, description = "File stored, redirects to /gallery"),
        (status = 400, description = "No file uploaded", body = ErrorResponseDto),
        (status = 413, description = "File too large", body = ErrorResponseDto),
        (status = 500, description = "Storage or database failure", body = ErrorResponseDto)
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    State(UploadLimit(max_upload_size)): State<UploadLimit>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != FILE_FIELD {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        // A part without a filename is a plain form value, not a file
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            debug!("Ignoring non-file part in field: {}", field_name);
            continue;
        };
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let data = field.bytes().await.map_err(multipart_error)?;

        // Browsers send an empty part when no file was picked
        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        if data.len() > max_upload_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the maximum upload size of {} bytes",
                max_upload_size
            )));
        }

        if upload.is_some() {
            return Err(AppError::BadRequest(
                "Only one file can be uploaded at a time".to_string(),
            ));
        }

        upload = Some(UploadedFile {
            name: if file_name.is_empty() {
                "unnamed".to_string()
            } else {
                file_name
            },
            content_type,
            data: data.to_vec(),
        });
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    service.upload(upload).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, GALLERY_PATH)]).into_response())
}

/// List all uploaded files, newest first
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All uploaded files", body = Vec<FileResponseDto>),
        (status = 500, description = "Failed to fetch files", body = ErrorResponseDto)
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
) -> Result<Json<Vec<FileResponseDto>>, AppError> {
    Ok(Json(service.list().await?))
}

/// Download a file
///
/// Streams the stored bytes back as an attachment with the MIME type
/// recorded at upload time.
#[utoipa::path(
    get,
    path = "/download/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid id", body = ErrorResponseDto),
        (status = 404, description = "File not found", body = ErrorResponseDto),
        (status = 500, description = "Storage or database failure", body = ErrorResponseDto)
    )
)]
pub async fn download_file(
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Response, AppError> {
    let download = service.download(id).await?;

    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&content_disposition(&download.name))
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.data,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::services::Clock;
    use crate::modules::storage::MemoryObjectStore;
    use crate::shared::test_helpers::{
        test_app, test_app_with, TEST_MAX_UPLOAD_SIZE, TEST_PUBLIC_BASE,
    };
    use crate::shared::types::ApiResponse;
    use axum_test::multipart::{MultipartForm, Part};
    use fake::faker::filesystem::en::FileName;
    use fake::Fake;

    fn file_form(name: &str, mime: &str, data: &[u8]) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(data.to_vec()).file_name(name).mime_type(mime),
        )
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("report 2024.pdf"),
            "attachment; filename=\"report 2024.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        assert_eq!(
            content_disposition("café \"menu\".txt"),
            "attachment; filename=\"caf_ _menu_.txt\"; \
             filename*=UTF-8''caf%C3%A9%20%22menu%22.txt"
        );
    }

    #[tokio::test]
    async fn test_upload_redirects_to_gallery() {
        let app = test_app();

        let response = app
            .server
            .post("/upload")
            .multipart(file_form("hello.txt", "text/plain", b"hello world"))
            .await;

        response.assert_status(StatusCode::FOUND);
        assert_eq!(response.header(header::LOCATION), GALLERY_PATH);

        let rows = app.repository.all();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_ready());
        assert_eq!(rows[0].name, "hello.txt");
        assert_eq!(rows[0].file_type, "text/plain");
        assert_eq!(rows[0].size, 11);
        assert_eq!(app.store.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let app = test_app();

        let response = app
            .server
            .post("/upload")
            .multipart(MultipartForm::new().add_text("caption", "no file here"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ApiResponse<()> = response.json();
        assert!(!body.success);
        assert_eq!(body.message.as_deref(), Some("No file uploaded"));
        assert!(app.repository.all().is_empty());
        assert!(app.store.is_empty());
    }

    #[tokio::test]
    async fn test_upload_text_value_in_file_field_is_rejected() {
        let app = test_app();

        let response = app
            .server
            .post("/upload")
            .multipart(MultipartForm::new().add_text("file", "just text"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ApiResponse<()> = response.json();
        assert_eq!(body.message.as_deref(), Some("No file uploaded"));
        assert!(app.repository.all().is_empty());
        assert!(app.store.is_empty());
    }

    #[tokio::test]
    async fn test_upload_at_size_limit_is_accepted() {
        let app = test_app();
        let content = vec![b'a'; TEST_MAX_UPLOAD_SIZE];

        let response = app
            .server
            .post("/upload")
            .multipart(file_form("exact.bin", "application/octet-stream", &content))
            .await;

        response.assert_status(StatusCode::FOUND);
        assert_eq!(app.repository.all()[0].size, TEST_MAX_UPLOAD_SIZE as i64);
    }

    #[tokio::test]
    async fn test_upload_over_size_limit_is_rejected() {
        let app = test_app();
        let content = vec![b'a'; TEST_MAX_UPLOAD_SIZE + 1];

        let response = app
            .server
            .post("/upload")
            .multipart(file_form("big.bin", "application/octet-stream", &content))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        let body: ApiResponse<()> = response.json();
        assert!(!body.success);
        assert!(app.repository.all().is_empty());
        assert!(app.store.is_empty());
    }

    #[tokio::test]
    async fn test_upload_with_wrong_field_name_is_rejected() {
        let app = test_app();

        let response = app
            .server
            .post("/upload")
            .multipart(MultipartForm::new().add_part(
                "attachment",
                Part::bytes(b"data".to_vec()).file_name("a.txt"),
            ))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(app.repository.all().is_empty());
        assert!(app.store.is_empty());
    }

    #[tokio::test]
    async fn test_same_name_in_same_millisecond_collides() {
        let clock: Clock = Arc::new(|| 1_700_000_000_000i64);
        let app = test_app_with(MemoryObjectStore::new(TEST_PUBLIC_BASE), Some(clock));

        let first = app
            .server
            .post("/upload")
            .multipart(file_form("dup.txt", "text/plain", b"one"))
            .await;
        first.assert_status(StatusCode::FOUND);

        let second = app
            .server
            .post("/upload")
            .multipart(file_form("dup.txt", "text/plain", b"two"))
            .await;

        second.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ApiResponse<()> = second.json();
        assert_eq!(
            body.message.as_deref(),
            Some("The resource already exists: 1700000000000_dup.txt")
        );

        let rows = app.repository.all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].size, 3);
        assert_eq!(
            app.store.object("1700000000000_dup.txt").unwrap().data,
            b"one".to_vec()
        );
    }

    #[tokio::test]
    async fn test_list_returns_newest_first() {
        let app = test_app();
        let mut names = Vec::new();

        for i in 0..3 {
            let name = format!("{}-{}", i, FileName().fake::<String>());
            app.server
                .post("/upload")
                .multipart(file_form(&name, "application/octet-stream", name.as_bytes()))
                .await
                .assert_status(StatusCode::FOUND);
            names.push(name);
        }

        let response = app.server.get("/files").await;

        response.assert_status_ok();
        let files: Vec<FileResponseDto> = response.json();
        assert_eq!(files.len(), 3);
        names.reverse();
        let listed: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        assert_eq!(listed, names);
        assert!(files
            .windows(2)
            .all(|pair| pair[0].uploaded_at >= pair[1].uploaded_at));
    }

    #[tokio::test]
    async fn test_list_serializes_type_field() {
        let app = test_app();
        app.server
            .post("/upload")
            .multipart(file_form("pic.png", "image/png", &[0x89, 0x50, 0x4e, 0x47]))
            .await
            .assert_status(StatusCode::FOUND);

        let files: serde_json::Value = app.server.get("/files").await.json();

        assert_eq!(files[0]["type"], "image/png");
        assert_eq!(files[0]["size"], 4);
        assert!(files[0]["url"]
            .as_str()
            .unwrap()
            .starts_with(TEST_PUBLIC_BASE));
    }

    #[tokio::test]
    async fn test_download_unknown_id_is_not_found() {
        let app = test_app();

        let response = app.server.get("/download/999").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: ApiResponse<()> = response.json();
        assert_eq!(body.message.as_deref(), Some("File not found"));
        assert!(response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .is_none());
    }

    #[tokio::test]
    async fn test_download_rejects_non_numeric_id() {
        let app = test_app();

        let response = app.server.get("/download/abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_download_returns_original_bytes() {
        let app = test_app();
        let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        app.server
            .post("/upload")
            .multipart(file_form("blob.bin", "application/x-custom", &content))
            .await
            .assert_status(StatusCode::FOUND);
        let id = app.repository.all()[0].id;

        let response = app.server.get(&format!("/download/{}", id)).await;

        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "application/x-custom");
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"blob.bin\""
        );
        assert_eq!(response.as_bytes().to_vec(), content);
    }
}
