use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::SecurityError;
use crate::jwt::JwtService;

/// Payload keys. Deliberately terse to keep tokens small.
pub mod claim {
    pub const SUBJECT: &str = "sub";
    pub const JWT_ID: &str = "jti";
    pub const AUDIENCE: &str = "aud";
    pub const ISSUER: &str = "iss";
    pub const ISSUED_AT: &str = "iat";
    pub const VALID_FROM: &str = "nbf";
    pub const EXPIRATION: &str = "exp";
    pub const USERNAME: &str = "sn";
    pub const EMAIL: &str = "@";
    pub const FIRST_NAME: &str = "fn";
    pub const LAST_NAME: &str = "ln";
    pub const PERMISSIONS: &str = "p";
    pub const IS_ADMIN: &str = "su";
}

/// A principal's session, as decoded from (or about to be encoded into) a token.
///
/// PII fields hold plaintext here; they are masked only inside the token
/// payload. Serializes to a camelCase JSON view that never includes the raw
/// token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// The signed compact token this model came from or was issued as.
    #[serde(skip)]
    pub raw_jwt: Option<String>,

    pub account_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Application-defined permission bitmask; `0` means no extra permissions.
    #[serde(rename = "permissions", default, skip_serializing_if = "is_zero")]
    pub permission_set: u32,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_admin: bool,

    pub jwt_id: String,
    pub audience: String,
    pub issuer: String,
    pub issued_at: i64,
    pub expiration: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<i64>,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl TokenInfo {
    pub fn seconds_remaining_at(&self, now: i64) -> i64 {
        (self.expiration - now).max(0)
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiration <= now
    }

    pub fn seconds_remaining(&self) -> i64 {
        self.seconds_remaining_at(SystemClock.now())
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemClock.now())
    }

    /// The signed token for this model.
    ///
    /// Returns [`raw_jwt`](Self::raw_jwt) when it is already set. Otherwise a
    /// new token is issued from this model's account, PII, permission and
    /// admin fields, stored in `raw_jwt`, and returned.
    pub fn to_jwt(&mut self, service: &JwtService) -> Result<&str, SecurityError> {
        if self.raw_jwt.is_none() {
            let jwt = service.generate_jwt(&self.to_request())?;
            self.raw_jwt = Some(jwt);
        }
        Ok(self.raw_jwt.as_deref().unwrap_or_default())
    }

    /// Validate `jwt` and decode it. See [`JwtService::validate_jwt`].
    pub fn from_jwt(jwt: &str, service: &JwtService) -> Result<Self, SecurityError> {
        service.validate_jwt(jwt)
    }

    /// Like [`from_jwt`](Self::from_jwt), treating any failure as "no token".
    pub fn try_from_jwt(jwt: Option<&str>, service: &JwtService) -> Option<Self> {
        service.try_from_jwt(jwt)
    }

    /// An issuance request carrying this model's identity fields.
    pub fn to_request(&self) -> TokenRequest {
        TokenRequest {
            account_id: self.account_id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            permissions: self.permission_set,
            is_admin: self.is_admin,
            delay_secs: 0,
        }
    }
}

/// Parameters for issuing a token. Only `account_id` is required.
///
/// ```rust,ignore
/// let request = TokenRequest::new("abc123").email("jane@example.com").admin(true);
/// let jwt = service.generate_jwt(&request)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    pub account_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub permissions: u32,
    pub is_admin: bool,
    /// Seconds after issuance before the token is meant to become valid.
    pub delay_secs: u64,
}

impl TokenRequest {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    pub fn username(mut self, v: impl Into<String>) -> Self {
        self.username = Some(v.into());
        self
    }

    pub fn email(mut self, v: impl Into<String>) -> Self {
        self.email = Some(v.into());
        self
    }

    pub fn first_name(mut self, v: impl Into<String>) -> Self {
        self.first_name = Some(v.into());
        self
    }

    pub fn last_name(mut self, v: impl Into<String>) -> Self {
        self.last_name = Some(v.into());
        self
    }

    pub fn permissions(mut self, flags: u32) -> Self {
        self.permissions = flags;
        self
    }

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn delay(mut self, secs: u64) -> Self {
        self.delay_secs = secs;
        self
    }
}
