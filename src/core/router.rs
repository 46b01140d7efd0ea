use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;

use crate::features::files::{self, FileService};
use crate::features::pages::{self, PageService};

/// Simple health check endpoint
async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Application routes without the outer middleware stack
pub fn app_router(
    file_service: Arc<FileService>,
    page_service: Arc<PageService>,
    max_upload_size: usize,
) -> Router {
    Router::new()
        .merge(files::routes(file_service, max_upload_size))
        .merge(pages::routes(page_service))
        .route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use crate::shared::test_helpers::test_app;

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();

        app.server.get("/health").await.assert_status_ok();
    }
}
