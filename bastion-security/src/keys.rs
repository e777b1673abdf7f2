use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::SecurityError;

const GENERATED_KEY_BITS: usize = 2048;

/// An RSA key pair as PEM strings.
///
/// The private key is PKCS#8 (`BEGIN PRIVATE KEY`), the public key is SPKI
/// (`BEGIN PUBLIC KEY`).
#[derive(Clone)]
pub struct KeyPair {
    pub private_pem: String,
    pub public_pem: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_pem", &"<redacted>")
            .field("public_pem", &self.public_pem)
            .finish()
    }
}

impl KeyPair {
    /// Generate a new RSA-2048 key pair.
    pub fn generate() -> Result<Self, SecurityError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, GENERATED_KEY_BITS)
            .map_err(|e| SecurityError::NotConfigured(format!("RSA key generation failed: {e}")))?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| SecurityError::NotConfigured(format!("cannot export private key: {e}")))?
            .to_string();
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| SecurityError::NotConfigured(format!("cannot export public key: {e}")))?;

        Ok(Self {
            private_pem,
            public_pem,
        })
    }
}

/// Environment variables often carry PEM blocks with escaped newlines.
fn normalize_pem(pem: &str) -> String {
    pem.trim().replace("\\n", "\n")
}

/// Parse an RSA private key from PEM.
///
/// Accepts both a bare PKCS#1 key (`BEGIN RSA PRIVATE KEY`) and a PKCS#8
/// container (`BEGIN PRIVATE KEY`).
pub(crate) fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, SecurityError> {
    let pem = normalize_pem(pem);
    RsaPrivateKey::from_pkcs8_pem(&pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
        .map_err(|e| SecurityError::NotConfigured(format!("unable to read RSA private key: {e}")))
}

/// Parse an RSA public key from PEM, SPKI (`BEGIN PUBLIC KEY`) or PKCS#1
/// (`BEGIN RSA PUBLIC KEY`).
pub(crate) fn parse_public_key(pem: &str) -> Result<RsaPublicKey, SecurityError> {
    let pem = normalize_pem(pem);
    RsaPublicKey::from_public_key_pem(&pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(&pem))
        .map_err(|e| SecurityError::NotConfigured(format!("unable to read RSA public key: {e}")))
}

/// Convert a parsed private key into the signer's native representation.
pub(crate) fn encoding_key(key: &RsaPrivateKey) -> Result<EncodingKey, SecurityError> {
    let der = key
        .to_pkcs1_der()
        .map_err(|e| SecurityError::NotConfigured(format!("cannot encode RSA private key: {e}")))?;
    Ok(EncodingKey::from_rsa_der(der.as_bytes()))
}

/// Convert a parsed public key into the verifier's native representation.
pub(crate) fn decoding_key(key: &RsaPublicKey) -> Result<DecodingKey, SecurityError> {
    let n = URL_SAFE_NO_PAD.encode(key.n().to_bytes_be());
    let e = URL_SAFE_NO_PAD.encode(key.e().to_bytes_be());
    DecodingKey::from_rsa_components(&n, &e)
        .map_err(|e| SecurityError::NotConfigured(format!("cannot build RSA decoding key: {e}")))
}

/// Whether `public` is the public half of `private`.
pub(crate) fn is_pair(private: &RsaPrivateKey, public: &RsaPublicKey) -> bool {
    RsaPublicKey::from(private) == *public
}
