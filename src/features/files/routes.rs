use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{download_file, list_files, upload_file};
use crate::features::files::services::FileService;

/// Headroom for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Largest accepted file, in bytes
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

#[derive(Clone, FromRef)]
pub struct FilesState {
    pub service: Arc<FileService>,
    pub upload_limit: UploadLimit,
}

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>, max_upload_size: usize) -> Router {
    let state = FilesState {
        service: file_service,
        upload_limit: UploadLimit(max_upload_size),
    };

    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(
                max_upload_size.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .route("/files", get(list_files))
        .route("/download/{id}", get(download_file))
        .with_state(state)
}
