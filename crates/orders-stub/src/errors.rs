use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StubError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing or invalid bearer token")]
    Unauthorized,

    #[error("Access to {0} is forbidden")]
    Forbidden(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let code = match &self {
            StubError::BadRequest(_) => StatusCode::BAD_REQUEST,
            StubError::NotFound(_) => StatusCode::NOT_FOUND,
            StubError::Unauthorized => StatusCode::UNAUTHORIZED,
            StubError::Forbidden(_) => StatusCode::FORBIDDEN,
        };

        let body = serde_json::to_string(&ErrorBody {
            message: self.to_string(),
        })
        .unwrap_or_else(|_| "{\"message\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}
