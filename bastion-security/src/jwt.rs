use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::clock::{Clock, SystemClock};
use crate::config::JwtConfiguration;
use crate::error::SecurityError;
use crate::masking;
use crate::signer::Claims;
use crate::token::{claim, TokenInfo, TokenRequest};

/// Issues and validates tokens against one [`JwtConfiguration`].
///
/// Cheap to clone; clones share the configuration and clock.
#[derive(Clone)]
pub struct JwtService {
    config: Arc<JwtConfiguration>,
    clock: Arc<dyn Clock>,
}

impl JwtService {
    pub fn new(config: impl Into<Arc<JwtConfiguration>>) -> Self {
        Self {
            config: config.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source. Mostly useful in tests.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &JwtConfiguration {
        &self.config
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Issue a signed token.
    ///
    /// PII fields are masked before they enter the payload. Permission flags
    /// and the admin flag are written only when they differ from their
    /// defaults. A positive `delay_secs` adds `nbf = iat + delay_secs`.
    pub fn generate_jwt(&self, request: &TokenRequest) -> Result<String, SecurityError> {
        if request.account_id.trim().is_empty() {
            return Err(SecurityError::InvalidValue {
                field: "account_id",
            });
        }

        let now = self.clock.now();
        let nbf = (request.delay_secs > 0).then(|| {
            now.saturating_add(i64::try_from(request.delay_secs).unwrap_or(i64::MAX))
        });
        let claims = IssuedClaims {
            sub: &request.account_id,
            jti: uuid::Uuid::new_v4().to_string(),
            aud: self.config.audience(),
            iss: self.config.issuer(),
            iat: now,
            nbf,
            exp: now.saturating_add(self.config.lifetime_secs()),
            username: request.username.as_deref().and_then(masking::mask),
            email: request.email.as_deref().and_then(masking::mask),
            first_name: request.first_name.as_deref().and_then(masking::mask),
            last_name: request.last_name.as_deref().and_then(masking::mask),
            permissions: request.permissions,
            is_admin: request.is_admin,
        };

        let jwt = self.config.signer().sign(&claims)?;
        debug!(sub = %request.account_id, jti = %claims.jti, "Issued JWT");
        Ok(jwt)
    }

    /// Verify `token` and decode it into a [`TokenInfo`].
    ///
    /// Checks run in this order: signature, required claims, expiry,
    /// audience, then `nbf` if enforced. Observers run last, and the returned
    /// model's `raw_jwt` is the input string.
    pub fn validate_jwt(&self, token: &str) -> Result<TokenInfo, SecurityError> {
        if token.trim().is_empty() {
            return Err(SecurityError::InvalidToken("token is empty".into()));
        }

        let claims = self.config.verifier().verify(token)?;
        let mut info = token_from_claims(&claims)?;

        let now = self.clock.now();
        if info.is_expired_at(now) {
            debug!(sub = %info.account_id, exp = info.expiration, now, "Rejecting expired JWT");
            return Err(SecurityError::ExpiredToken {
                expired_for: now - info.expiration,
            });
        }
        if info.audience != self.config.audience() {
            debug!(
                sub = %info.account_id,
                audience = %info.audience,
                expected = %self.config.audience(),
                "Rejecting JWT issued for another audience"
            );
            return Err(SecurityError::InvalidToken(format!(
                "audience `{}` does not match this server",
                info.audience
            )));
        }
        if self.config.enforces_not_before() {
            if let Some(nbf) = info.valid_from.filter(|nbf| *nbf > now) {
                return Err(SecurityError::NotYetValid {
                    remaining: nbf - now,
                });
            }
        }

        info.raw_jwt = Some(token.to_string());
        self.notify(&info)?;

        debug!(sub = %info.account_id, "JWT validated");
        Ok(info)
    }

    /// [`validate_jwt`](Self::validate_jwt) for callers that treat a missing
    /// or bad token as "anonymous". Failures are logged at `debug` only.
    pub fn try_from_jwt(&self, token: Option<&str>) -> Option<TokenInfo> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;
        match self.validate_jwt(token) {
            Ok(info) => Some(info),
            Err(e) => {
                debug!(error = %e, "Ignoring token that failed validation");
                None
            }
        }
    }

    fn notify(&self, info: &TokenInfo) -> Result<(), SecurityError> {
        for observer in self.config.observers() {
            if let Err(e) = observer(info) {
                if !self.config.isolates_observers() {
                    return Err(e.into());
                }
                error!(sub = %info.account_id, error = %e, "Authentication observer failed");
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct IssuedClaims<'a> {
    sub: &'a str,
    jti: String,
    aud: &'a str,
    iss: &'a str,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    nbf: Option<i64>,
    exp: i64,
    #[serde(rename = "sn", skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(rename = "@", skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(rename = "fn", skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(rename = "ln", skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(rename = "p", skip_serializing_if = "is_zero")]
    permissions: u32,
    #[serde(rename = "su", skip_serializing_if = "is_false")]
    is_admin: bool,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Map a payload onto the token model, unmasking PII.
///
/// Fails with [`SecurityError::MissingClaim`] when a standard claim is absent
/// and [`SecurityError::InvalidToken`] when a claim has the wrong JSON type.
pub(crate) fn token_from_claims(claims: &Claims) -> Result<TokenInfo, SecurityError> {
    Ok(TokenInfo {
        raw_jwt: None,
        account_id: required_str(claims, claim::SUBJECT)?,
        jwt_id: required_str(claims, claim::JWT_ID)?,
        audience: required_str(claims, claim::AUDIENCE)?,
        issuer: required_str(claims, claim::ISSUER)?,
        issued_at: required_i64(claims, claim::ISSUED_AT)?,
        expiration: required_i64(claims, claim::EXPIRATION)?,
        valid_from: optional_i64(claims, claim::VALID_FROM)?,
        username: masked_str(claims, claim::USERNAME)?,
        email: masked_str(claims, claim::EMAIL)?,
        first_name: masked_str(claims, claim::FIRST_NAME)?,
        last_name: masked_str(claims, claim::LAST_NAME)?,
        permission_set: permissions(claims)?,
        is_admin: optional_bool(claims, claim::IS_ADMIN)?,
    })
}

fn wrong_type(key: &str, expected: &str) -> SecurityError {
    SecurityError::InvalidToken(format!("claim `{key}` is not {expected}"))
}

fn present<'c>(claims: &'c Claims, key: &str) -> Option<&'c Value> {
    claims.get(key).filter(|v| !v.is_null())
}

fn required_str(claims: &Claims, key: &'static str) -> Result<String, SecurityError> {
    let value = present(claims, key).ok_or(SecurityError::MissingClaim(key))?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| wrong_type(key, "a string"))
}

fn required_i64(claims: &Claims, key: &'static str) -> Result<i64, SecurityError> {
    optional_i64(claims, key)?.ok_or(SecurityError::MissingClaim(key))
}

fn optional_i64(claims: &Claims, key: &str) -> Result<Option<i64>, SecurityError> {
    present(claims, key)
        .map(|v| v.as_i64().ok_or_else(|| wrong_type(key, "an integer")))
        .transpose()
}

fn optional_bool(claims: &Claims, key: &str) -> Result<bool, SecurityError> {
    present(claims, key)
        .map(|v| v.as_bool().ok_or_else(|| wrong_type(key, "a boolean")))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn masked_str(claims: &Claims, key: &str) -> Result<Option<String>, SecurityError> {
    present(claims, key)
        .map(|v| {
            v.as_str()
                .map(masking::unmask)
                .ok_or_else(|| wrong_type(key, "a string"))
        })
        .transpose()
}

fn permissions(claims: &Claims) -> Result<u32, SecurityError> {
    let Some(value) = present(claims, claim::PERMISSIONS) else {
        return Ok(0);
    };
    value
        .as_u64()
        .and_then(|p| u32::try_from(p).ok())
        .ok_or_else(|| wrong_type(claim::PERMISSIONS, "a 32-bit permission mask"))
}
