use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SifterError {
    #[error("missing keyword")]
    MissingKeyword,

    #[error("keyword exceeds {max} code points")]
    KeywordTooLong { max: usize },

    #[error("invalid sort: {0}")]
    InvalidSort(String),

    #[error("invalid order: {0}")]
    InvalidOrder(i64),

    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    #[error("invalid from: {0}")]
    InvalidFrom(i64),

    #[error("invalid size: {0}")]
    InvalidSize(i64),

    #[error("paging too deep: from+size exceeds {max}")]
    PagingTooDeep { max: i64 },

    #[error("size exceeds {max}")]
    SizeTooLarge { max: i64 },

    #[error("keyword too long: {count} clauses, max {max}")]
    TooManyClauses { count: usize, max: usize },

    #[error("invalid search params: {0}")]
    InvalidParams(String),

    #[error("keyword analysis failed")]
    AnalyzeFailed,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("exceeded the request limit for user info lookups")]
    RateLimited,

    #[error("get user info failed: {0}")]
    ProbeFailed(String),

    #[error("search engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SifterError>;

impl SifterError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SifterError::MissingKeyword
            | SifterError::KeywordTooLong { .. }
            | SifterError::InvalidSort(_)
            | SifterError::InvalidOrder(_)
            | SifterError::InvalidOperator(_)
            | SifterError::InvalidFrom(_)
            | SifterError::InvalidSize(_)
            | SifterError::PagingTooDeep { .. }
            | SifterError::SizeTooLarge { .. }
            | SifterError::TooManyClauses { .. }
            | SifterError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            SifterError::UserNotFound(_) => StatusCode::NOT_FOUND,
            SifterError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            SifterError::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SifterError::AnalyzeFailed
            | SifterError::ProbeFailed(_)
            | SifterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable code for the JSON error body.
    pub fn error_code(&self) -> &'static str {
        match self {
            SifterError::MissingKeyword => "missing_keyword",
            SifterError::KeywordTooLong { .. } => "keyword_too_long",
            SifterError::InvalidSort(_) => "invalid_sort",
            SifterError::InvalidOrder(_) => "invalid_order",
            SifterError::InvalidOperator(_) => "invalid_operator",
            SifterError::InvalidFrom(_) => "invalid_from",
            SifterError::InvalidSize(_) => "invalid_size",
            SifterError::PagingTooDeep { .. } => "paging_too_deep",
            SifterError::SizeTooLarge { .. } => "size_too_large",
            SifterError::TooManyClauses { .. } => "too_many_clauses",
            SifterError::InvalidParams(_) => "invalid_params",
            SifterError::AnalyzeFailed => "analyze_failed",
            SifterError::UserNotFound(_) => "user_not_found",
            SifterError::RateLimited => "rate_limited",
            SifterError::ProbeFailed(_) => "user_info_failed",
            SifterError::EngineUnavailable(_) => "engine_unavailable",
            SifterError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to hand to the client. Upstream causes stay in the logs.
    fn client_message(&self) -> String {
        match self {
            SifterError::EngineUnavailable(_) => "search engine unavailable".to_string(),
            SifterError::ProbeFailed(_) => "get user info failed".to_string(),
            SifterError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

// Axum IntoResponse implementation (feature-gated)
#[cfg(feature = "axum-support")]
use axum::response::{IntoResponse, Json, Response};
#[cfg(feature = "axum-support")]
use serde::Serialize;

#[cfg(feature = "axum-support")]
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub request_id: String,
}

#[cfg(feature = "axum-support")]
impl IntoResponse for SifterError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.client_message(),
            request_id: format!("req_sf_{}", uuid::Uuid::new_v4()),
        };
        (status, Json(body)).into_response()
    }
}
