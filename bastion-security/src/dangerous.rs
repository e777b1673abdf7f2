//! Reading tokens without establishing trust.
//!
//! Nothing here checks a signature, expiry or audience. Use it for logging
//! and introspection only, never for an authorization decision.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::error::SecurityError;
use crate::jwt::token_from_claims;
use crate::signer::Claims;
use crate::token::TokenInfo;

/// Decode the payload of a compact token **without verifying it**.
pub fn insecure_read_claims(token: &str) -> Result<Claims, SecurityError> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(SecurityError::InvalidToken(
            "expected three dot-separated segments".into(),
        ));
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| SecurityError::InvalidToken(format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| SecurityError::InvalidToken(format!("payload is not a JSON object: {e}")))
}

/// Decode a token into the model **without verifying it**.
///
/// PII is unmasked and `raw_jwt` is set to the input, but the result may be
/// forged, expired, or meant for another audience.
pub fn insecure_read_token(token: &str) -> Result<TokenInfo, SecurityError> {
    let claims = insecure_read_claims(token)?;
    let mut info = token_from_claims(&claims)?;
    info.raw_jwt = Some(token.trim().to_string());
    Ok(info)
}
