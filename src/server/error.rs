//! # 服务端错误
//!
//! 处理函数统一返回 `Result<T, ServerError>`，错误被转换为
//! `{"error": "..."}` JSON 响应。内部错误只记录日志，不向客户端暴露细节。

use crate::error::{ConverterError, ErrorKind};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("payload too large: {0}")]
    TooLarge(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ServerError::TooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m),
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// 批量级前置条件错误属于客户端错误
impl From<ConverterError> for ServerError {
    fn from(e: ConverterError) -> Self {
        match e.kind() {
            ErrorKind::InvalidPath
            | ErrorKind::PathEscape
            | ErrorKind::NotFound
            | ErrorKind::UnsupportedFormat
            | ErrorKind::DestinationCollision
            | ErrorKind::InvalidArgument => ServerError::BadRequest(e.to_string()),
            _ => ServerError::Internal(e.to_string()),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(e: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("conversion task failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let bad: ServerError = ConverterError::UnsupportedFormat("gif".into()).into();
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let internal: ServerError = ConverterError::Other("boom".into()).into();
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        assert_eq!(
            ServerError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
