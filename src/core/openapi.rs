use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::ErrorResponseDto;

#[derive(OpenApi)]
#[openapi(
    paths(
        files_handlers::upload_file,
        files_handlers::list_files,
        files_handlers::download_file,
    ),
    components(
        schemas(
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            ErrorResponseDto,
        )
    ),
    tags(
        (name = "files", description = "File upload, listing and download"),
    ),
    info(
        title = "Uploads API",
        version = "0.1.0",
        description = "File upload, listing and download endpoints",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_file_routes() {
        let doc = ApiDoc::openapi();

        for path in ["/upload", "/files", "/download/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_swagger_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("desc"));
    }
}
