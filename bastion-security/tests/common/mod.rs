#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use bastion_security::{AuthConfigBuilder, FixedClock, JwtConfiguration, JwtService, KeyPair};

pub const AUDIENCE: &str = "orders";
pub const ISSUER: &str = "https://auth.bastion.test";
pub const LIFETIME: i64 = 3600;
pub const NOW: i64 = 1_700_000_000;

/// RSA generation is slow; every test in a binary shares one pair.
pub fn keys() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| KeyPair::generate().unwrap())
}

pub fn other_keys() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| KeyPair::generate().unwrap())
}

pub fn builder() -> AuthConfigBuilder {
    JwtConfiguration::builder()
        .audience(AUDIENCE)
        .issuer(ISSUER)
        .lifetime(LIFETIME)
        .keys(&keys().private_pem, &keys().public_pem)
}

pub fn service() -> JwtService {
    JwtService::new(builder().build().unwrap())
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(NOW))
}

pub fn service_at(clock: &Arc<FixedClock>) -> JwtService {
    service().with_clock(Arc::clone(clock))
}

/// Sign an arbitrary payload with the shared private key.
pub fn sign_raw(claims: &serde_json::Value) -> String {
    bastion_security::signer::sign(claims, &keys().private_pem).unwrap()
}
