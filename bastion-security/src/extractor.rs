use std::convert::Infallible;
use std::ops::Deref;

use bastion_core::http::header::{HeaderMap, Parts, AUTHORIZATION};
use bastion_core::http::{FromRequestParts, OptionalFromRequestParts};
use bastion_core::HttpError;
use tracing::debug;

use crate::evaluator::AuthRejection;
use crate::token::TokenInfo;

const BEARER_PREFIX: &str = "Bearer ";

/// Strip the literal `Bearer ` prefix from an `Authorization` header value.
///
/// Returns `None` for other schemes or an empty credential.
pub fn extract_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The bearer token from a request's headers, unvalidated.
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(extract_bearer)
}

/// The token resolved by the authorization middleware, if any.
///
/// Inserted into the request extensions on every request the middleware
/// lets through, and into the response extensions when it rejects one.
/// Extracting it never fails: without the middleware it is simply `None`.
#[derive(Debug, Clone, Default)]
pub struct ResolvedToken(pub Option<TokenInfo>);

impl ResolvedToken {
    pub fn token(&self) -> Option<&TokenInfo> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<TokenInfo> {
        self.0
    }
}

impl<S> FromRequestParts<S> for ResolvedToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resolved = parts.extensions.get::<ResolvedToken>().cloned();
        if resolved.is_none() {
            debug!(uri = %parts.uri, "No resolved token in request extensions");
        }
        Ok(resolved.unwrap_or_default())
    }
}

/// A handler argument that requires a validated token.
///
/// Reads what the authorization middleware resolved; rejects with
/// `not_authenticated` when there is none. Use `Option<Authenticated>` on
/// endpoints with an optional policy.
///
/// ```rust,ignore
/// async fn me(Authenticated(token): Authenticated) -> Json<TokenInfo> {
///     Json(token)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub TokenInfo);

impl Deref for Authenticated {
    type Target = TokenInfo;

    fn deref(&self) -> &TokenInfo {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match <Authenticated as OptionalFromRequestParts<S>>::from_request_parts(parts, state).await
        {
            Ok(Some(authenticated)) => Ok(authenticated),
            Ok(None) => Err(AuthRejection::NotAuthenticated.into()),
            Err(never) => match never {},
        }
    }
}

impl<S> OptionalFromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ResolvedToken>()
            .and_then(|resolved| resolved.0.clone())
            .map(Authenticated))
    }
}
