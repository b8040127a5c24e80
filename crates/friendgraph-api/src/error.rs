use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use friendgraph_core::FriendGraphError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    FriendGraph(#[from] FriendGraphError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::FriendGraph(err) => match err {
                FriendGraphError::InvalidIdentifier(_)
                | FriendGraphError::InvalidOperation(_)
                | FriendGraphError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                FriendGraphError::NotFound(_) => StatusCode::NOT_FOUND,
                FriendGraphError::StoreFailure(_)
                | FriendGraphError::Config(_)
                | FriendGraphError::Io(_)
                | FriendGraphError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", error_message);
        }

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
