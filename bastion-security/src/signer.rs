use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::SecurityError;
use crate::keys;

/// Decoded token payload.
pub type Claims = Map<String, Value>;

/// The only signature algorithm issued or accepted. Tokens whose header names
/// any other algorithm are rejected before the signature is checked.
pub const ALGORITHM: Algorithm = Algorithm::RS256;

/// Produces compact `header.payload.signature` tokens.
pub struct Signer {
    key: EncodingKey,
}

impl Signer {
    /// Parse a PEM private key (PKCS#1 or PKCS#8).
    pub fn from_pem(private_key_pem: &str) -> Result<Self, SecurityError> {
        Self::from_key(&keys::parse_private_key(private_key_pem)?)
    }

    pub(crate) fn from_key(private: &RsaPrivateKey) -> Result<Self, SecurityError> {
        Ok(Self {
            key: keys::encoding_key(private)?,
        })
    }

    pub fn sign<C: Serialize>(&self, claims: &C) -> Result<String, SecurityError> {
        encode(&Header::new(ALGORITHM), claims, &self.key)
            .map_err(|e| SecurityError::NotConfigured(format!("failed to sign JWT: {e}")))
    }
}

/// Checks token signatures and returns the payload.
pub struct Verifier {
    key: DecodingKey,
    validation: Validation,
}

impl Verifier {
    /// Parse a PEM public key (SPKI or PKCS#1).
    pub fn from_pem(public_key_pem: &str) -> Result<Self, SecurityError> {
        Self::from_key(&keys::parse_public_key(public_key_pem)?)
    }

    pub(crate) fn from_key(public: &RsaPublicKey) -> Result<Self, SecurityError> {
        Ok(Self {
            key: keys::decoding_key(public)?,
            validation: signature_only_validation(),
        })
    }

    /// Verify the signature and return the claims.
    ///
    /// Only the signature and algorithm are checked here; expiry, audience and
    /// required claims are the caller's business.
    pub fn verify(&self, token: &str) -> Result<Claims, SecurityError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "JWT signature verification failed");
            SecurityError::InvalidToken(e.to_string())
        })?;
        Ok(data.claims)
    }
}

fn signature_only_validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.algorithms = vec![ALGORITHM];
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Sign `claims` with a PEM private key, parsing the key on every call.
pub fn sign<C: Serialize>(claims: &C, private_key_pem: &str) -> Result<String, SecurityError> {
    Signer::from_pem(private_key_pem)?.sign(claims)
}

/// Verify `token` against a PEM public key, parsing the key on every call.
///
/// A key that cannot be parsed is [`SecurityError::NotConfigured`]; any
/// token problem is [`SecurityError::InvalidToken`].
pub fn verify(token: &str, public_key_pem: &str) -> Result<Claims, SecurityError> {
    Verifier::from_pem(public_key_pem)?.verify(token)
}
