use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A storage or status store failure. `context` is what the caller sees,
    /// `detail` only goes to the log.
    #[error("{context}: {detail:#}")]
    Backend {
        context: &'static str,
        detail: anyhow::Error,
    },
}

impl AppError {
    pub fn backend(context: &'static str) -> impl FnOnce(anyhow::Error) -> AppError {
        move |detail| AppError::Backend { context, detail }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
            AppError::Backend { context, detail } => {
                tracing::error!("{}: {:?}", context, detail);
                (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Method fallback for the API routes.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
