use std::fmt;

use bastion_core::http::{IntoResponse, Response};
use bastion_core::HttpError;

/// Broad failure class of a [`SecurityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input was missing at the call site.
    InvalidValue,
    /// Key material or configuration is missing or unusable.
    NotConfigured,
    /// Signature failure, malformed or missing claims, audience mismatch.
    InvalidToken,
    /// The token's expiration is in the past.
    ExpiredToken,
    /// An authentication observer rejected the token.
    Observer,
}

/// Errors from token issuance and validation.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    #[error("Missing required field: {field}")]
    InvalidValue { field: &'static str },

    #[error("Auth not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The signature is valid but a standard claim is absent.
    #[error("Token is missing required claim `{0}`")]
    MissingClaim(&'static str),

    #[error("Token expired {expired_for} seconds ago")]
    ExpiredToken { expired_for: i64 },

    #[error("Token is not valid for another {remaining} seconds")]
    NotYetValid { remaining: i64 },

    #[error("Authentication observer failed: {0}")]
    Observer(#[from] ObserverError),
}

impl SecurityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SecurityError::InvalidValue { .. } => ErrorKind::InvalidValue,
            SecurityError::NotConfigured(_) => ErrorKind::NotConfigured,
            SecurityError::InvalidToken(_)
            | SecurityError::MissingClaim(_)
            | SecurityError::NotYetValid { .. } => ErrorKind::InvalidToken,
            SecurityError::ExpiredToken { .. } => ErrorKind::ExpiredToken,
            SecurityError::Observer(_) => ErrorKind::Observer,
        }
    }

    /// Message that is safe to show to a client.
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidValue => "A required value is missing.",
            ErrorKind::NotConfigured | ErrorKind::Observer => {
                "The server encountered an error while authenticating."
            }
            ErrorKind::InvalidToken => "No valid token is present in the request.",
            ErrorKind::ExpiredToken => "The token has expired; please re-authenticate.",
        }
    }
}

impl From<SecurityError> for HttpError {
    fn from(err: SecurityError) -> Self {
        let message = err.public_message().to_string();
        match err.kind() {
            ErrorKind::InvalidValue => HttpError::BadRequest(err.to_string()),
            ErrorKind::NotConfigured | ErrorKind::Observer => {
                HttpError::internal(message, err.to_string())
            }
            ErrorKind::InvalidToken => HttpError::NotAuthenticated(message),
            ErrorKind::ExpiredToken => HttpError::TokenExpired(message),
        }
    }
}

impl IntoResponse for SecurityError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}

/// Failure reported by an authentication observer.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ObserverError(String);

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Every violation found while building a [`JwtConfiguration`](crate::JwtConfiguration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    pub errors: Vec<String>,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid auth configuration:")?;
        for err in &self.errors {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigurationError {}

impl From<ConfigurationError> for SecurityError {
    fn from(err: ConfigurationError) -> Self {
        SecurityError::NotConfigured(err.to_string())
    }
}
