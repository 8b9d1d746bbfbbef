use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// 接口错误
///
/// `details` 只在开发模式下填充，生产环境不向客户端暴露内部信息。
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Database connection not established")]
    StoreUnavailable { details: Option<String> },
    #[error("{message}")]
    Internal {
        message: &'static str,
        details: Option<String>,
    },
    #[error("{0}")]
    NotFound(&'static str),
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::StoreUnavailable { details } | Self::Internal { details, .. } => details.clone(),
            Self::NotFound(_) => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}
