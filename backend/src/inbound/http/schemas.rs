//! OpenAPI schema definitions for types the domain keeps framework-free.
//!
//! The domain does not derive `ToSchema`. These wrappers mirror the wire
//! shape of the corresponding types and exist only for documentation.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request collides with an existing resource.
    #[schema(rename = "conflict")]
    Conflict,
    /// The resource is not in a state that allows the operation.
    #[schema(rename = "invalid_state")]
    InvalidState,
    /// A backing service is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "rating must be between 1 and 5")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(rename = "traceId", example = "01HZY8B2-W6X5-Y7Z9-ABCD-123400000000")]
    trace_id: Option<String>,
    /// Supplementary details such as `{ "field": "rating", "code": "invalid_value" }`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`pagination::Paginated`].
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct Page<T> {
    items: Vec<T>,
    total: u64,
    #[schema(rename = "currentPage")]
    current_page: u32,
    #[schema(rename = "totalPages")]
    total_pages: u64,
}
