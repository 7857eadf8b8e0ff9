//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** Internal errors (Database, Internal) are logged with
//! full detail but only a generic message is returned to the caller so that
//! file paths, SQL, or other implementation details never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the incontext request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A required field was empty or otherwise invalid.
    #[error("{0}")]
    Validation(String),

    /// The caller referenced a conversation that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller is not the creator of the conversation.
    ///
    /// 403 means Forbidden; 401 would mean "unauthenticated", which instead
    /// redirects to the login route (see [`ServerError::Unauthenticated`]).
    #[error("forbidden")]
    Forbidden,

    /// No valid session accompanied the request.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Propagated from the SQLite (or other) store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_owned()),

            // Unauthenticated callers are sent to the login route rather than
            // given a bare 401.
            ServerError::Unauthenticated => return Redirect::to("/auth/login").into_response(),

            // Internal errors: log the full detail, return a generic message.
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}
