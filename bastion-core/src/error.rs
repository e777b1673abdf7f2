use serde::Serialize;

use crate::http::{IntoResponse, Json, Response, StatusCode};

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<&'a str>,
}

/// Helper to create a JSON error response with a standard
/// `{ "error": code, "message": message }` body.
pub fn error_response(status: StatusCode, code: &str, message: impl AsRef<str>) -> Response {
    let body = ErrorBody {
        error: code,
        message: message.as_ref(),
        debug: None,
    };
    (status, Json(body)).into_response()
}

/// A request failure that is safe to return to the client.
///
/// Every variant maps to a stable `error` code so that clients can tell
/// "not authenticated" apart from "not authorized" apart from "malformed
/// request" without parsing messages. Both authentication and
/// authorization rejections answer with `403 Forbidden`.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// No valid token was presented where one is required.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// A token was presented but has expired; the client should re-authenticate.
    #[error("Token expired: {0}")]
    TokenExpired(String),

    /// The principal is known but lacks the required privilege.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-side failure. `detail` is only exposed in debug builds.
    #[error("Internal error: {message}")]
    Internal { message: String, detail: Option<String> },
}

impl HttpError {
    /// Internal error with a public message and a private detail.
    pub fn internal(message: impl Into<String>, detail: impl Into<String>) -> Self {
        HttpError::Internal {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    /// Stable machine-readable code used as the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            HttpError::NotAuthenticated(_) => "not_authenticated",
            HttpError::TokenExpired(_) => "token_expired",
            HttpError::NotAuthorized(_) => "not_authorized",
            HttpError::BadRequest(_) => "bad_request",
            HttpError::NotFound(_) => "not_found",
            HttpError::Internal { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotAuthenticated(_)
            | HttpError::TokenExpired(_)
            | HttpError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        match &self {
            HttpError::NotAuthenticated(msg)
            | HttpError::TokenExpired(msg)
            | HttpError::NotAuthorized(msg)
            | HttpError::BadRequest(msg)
            | HttpError::NotFound(msg) => error_response(status, code, msg),
            HttpError::Internal { message, detail } => {
                let debug = if cfg!(debug_assertions) {
                    detail.as_deref()
                } else {
                    None
                };
                let body = ErrorBody {
                    error: code,
                    message,
                    debug,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::internal("The server encountered an error.", err.to_string())
    }
}
