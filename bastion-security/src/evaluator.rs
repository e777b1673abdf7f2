use bastion_core::http::{IntoResponse, Response};
use bastion_core::HttpError;
use tracing::{debug, info, warn};

use crate::error::ErrorKind;
use crate::extractor::extract_bearer;
use crate::jwt::JwtService;
use crate::policy::{AuthPolicy, EndpointPolicy};
use crate::token::TokenInfo;

/// Why a request was stopped before reaching its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    /// No valid token where one is required.
    #[error("No valid token is present in the request.")]
    NotAuthenticated,
    /// The only token presented has expired.
    #[error("The token has expired; please re-authenticate.")]
    TokenExpired,
    /// The token is valid but lacks the required privilege.
    #[error("A valid admin token is required.")]
    NotAuthorized,
}

impl From<AuthRejection> for HttpError {
    fn from(rejection: AuthRejection) -> Self {
        match rejection {
            AuthRejection::NotAuthenticated => HttpError::NotAuthenticated(rejection.to_string()),
            AuthRejection::NotAuthorized => HttpError::NotAuthorized(rejection.to_string()),
            AuthRejection::TokenExpired => HttpError::TokenExpired(rejection.to_string()),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}

/// Result of evaluating one request.
///
/// `token` is populated whenever a valid token was presented, even when the
/// request is rejected, so audit logging can see who tried.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub token: Option<TokenInfo>,
    pub outcome: Result<(), AuthRejection>,
}

impl Evaluation {
    pub fn is_allowed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Applies an [`EndpointPolicy`] to a request's `Authorization` header.
#[derive(Clone)]
pub struct PolicyEvaluator {
    service: JwtService,
}

impl PolicyEvaluator {
    pub fn new(service: JwtService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &JwtService {
        &self.service
    }

    /// Evaluate `policy` for a request.
    ///
    /// `authorization` is the raw header value, if any; `endpoint` is only
    /// used for logging. Endpoints with no declared policy are let through
    /// with a warning. An expired token on a required endpoint is rejected
    /// as [`AuthRejection::TokenExpired`]; optional endpoints treat it as
    /// absent.
    pub fn evaluate(
        &self,
        policy: &EndpointPolicy,
        authorization: Option<&str>,
        endpoint: &str,
    ) -> Evaluation {
        if policy.is_unconfigured() {
            warn!(
                endpoint,
                "No auth policy declared for this endpoint; all traffic will be allowed. \
                 Declare EndpointPolicy::no_auth() if this is intentional"
            );
        }

        let mut expired = false;
        let token = match authorization.and_then(extract_bearer) {
            Some(jwt) => match self.service.validate_jwt(jwt) {
                Ok(info) => Some(info),
                Err(e) => {
                    debug!(endpoint, error = %e, "Ignoring token that failed validation");
                    expired = e.kind() == ErrorKind::ExpiredToken;
                    None
                }
            },
            None => None,
        };

        if policy.flags().contains(AuthPolicy::PERMISSIONS) && !policy.is_optional() {
            debug!(endpoint, "Permissions policy declared but not evaluated");
        }

        let outcome = match &token {
            None if policy.is_optional() => Ok(()),
            None if expired => {
                debug!(endpoint, "Presented token has expired");
                Err(AuthRejection::TokenExpired)
            }
            None => {
                debug!(endpoint, "No valid token present in request");
                Err(AuthRejection::NotAuthenticated)
            }
            Some(token) if policy.requires_admin() && !token.is_admin => {
                info!(endpoint, sub = %token.account_id, "Admin token required");
                Err(AuthRejection::NotAuthorized)
            }
            Some(_) => Ok(()),
        };

        Evaluation { token, outcome }
    }
}
