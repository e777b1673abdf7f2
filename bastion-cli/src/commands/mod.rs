//! Command implementations for the `bastion` CLI.
//!
//! Each submodule corresponds to a top-level command and writes its output
//! to the given writer.

use std::error::Error;
use std::path::Path;

use bastion_core::BastionConfig;
use bastion_security::{AuthConfigBuilder, JwtService};

/// Key generation - `bastion keygen`.
pub mod keygen;

/// Token issuance - `bastion issue <account-id>`.
pub mod issue;

/// Full validation - `bastion verify <token>`.
pub mod verify;

/// Unverified decoding - `bastion inspect <token>`.
pub mod inspect;

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Build a token service from the configuration layers found in `dir`.
pub fn load_service(dir: &Path, profile: &str) -> Result<JwtService, Box<dyn Error>> {
    let config = BastionConfig::load_in(dir, profile)?;
    let jwt = AuthConfigBuilder::from_config(&config).build()?;
    Ok(JwtService::new(jwt))
}
