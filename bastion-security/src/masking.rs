//! Reversible obfuscation of PII claim values.
//!
//! Values are encrypted with AES-256-CBC under a fixed, compiled-in key and a
//! fresh random IV per call; the output is `base64(iv || ciphertext)`.
//!
//! The key is shared by every build of this crate. Masking keeps PII out of
//! sight of anyone casually decoding a token; it is **not** confidentiality
//! against someone holding this crate's key material.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use tracing::warn;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const MASK_KEY: &[u8; 32] = b"bastion/claim-mask/v1::0x5f3759d";
const IV_LEN: usize = 16;

/// Mask a plaintext value. Returns `None` for empty or whitespace-only input.
///
/// The plaintext is trimmed first. Two calls with the same input produce
/// different outputs.
pub fn mask(plaintext: &str) -> Option<String> {
    let trimmed = plaintext.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = match Aes256CbcEnc::new_from_slices(MASK_KEY, &iv) {
        Ok(cipher) => cipher,
        Err(e) => {
            warn!(error = %e, "Unable to mask claim value; omitting it");
            return None;
        }
    };
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(trimmed.as_bytes());

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Some(STANDARD.encode(out))
}

/// Reverse [`mask`].
///
/// Never fails: when the input cannot be decoded or decrypted, the failure is
/// logged and the input is returned unchanged.
pub fn unmask(masked: &str) -> String {
    match try_unmask(masked) {
        Ok(plain) => plain,
        Err(reason) => {
            warn!(reason, "Unable to unmask claim value; returning it as-is");
            masked.to_string()
        }
    }
}

fn try_unmask(masked: &str) -> Result<String, &'static str> {
    let bytes = STANDARD.decode(masked.trim()).map_err(|_| "invalid base64")?;
    if bytes.len() <= IV_LEN {
        return Err("value shorter than IV");
    }
    let (iv, ciphertext) = bytes.split_at(IV_LEN);
    let cipher = Aes256CbcDec::new_from_slices(MASK_KEY, iv).map_err(|_| "invalid IV length")?;
    let plain = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| "decryption failed")?;
    String::from_utf8(plain).map_err(|_| "decrypted value is not UTF-8")
}
