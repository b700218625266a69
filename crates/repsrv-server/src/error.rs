use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use repsrv_store::StoreError;
use repsrv_types::TypeError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Type(_) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::InvalidArgument(_) | StoreError::InvalidMode(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(StoreError::TypeMismatch { .. }) => StatusCode::CONFLICT,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use repsrv_types::Iri;

    #[test]
    fn store_errors_map_to_status() {
        let id = Iri::parse("https://h/x").unwrap();
        assert_eq!(ServerError::from(StoreError::NotFound(id.clone())).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServerError::from(StoreError::InvalidArgument("no id".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(StoreError::InvalidMode("append".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(StoreError::TypeMismatch { id, expected: "OrderedCollection" }).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn other_errors_map_to_status() {
        assert_eq!(ServerError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServerError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ServerError::from(TypeError::NotAnObject("array")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_carries_status() {
        let response = ServerError::BadRequest("missing id".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
