use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppPath;
use crate::features::pages::services::PageService;

/// Upload form
pub async fn index(State(service): State<Arc<PageService>>) -> Result<Html<String>> {
    Ok(Html(service.render_index()?))
}

/// Gallery page
pub async fn gallery(State(service): State<Arc<PageService>>) -> Result<Html<String>> {
    Ok(Html(service.render_gallery()?))
}

/// Detail page for one file
pub async fn file_detail(
    State(service): State<Arc<PageService>>,
    AppPath(id): AppPath<i64>,
) -> Result<Html<String>> {
    Ok(Html(service.render_file(id).await?))
}
