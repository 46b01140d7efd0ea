use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON envelope for error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

/// Error body layout for OpenAPI documentation
/// Note: responses are built from `ApiResponse<()>`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ErrorResponseDto {
    pub success: bool,
    pub data: Option<String>,
    /// Human readable error message
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}
