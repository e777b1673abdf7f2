//! Core runtime pieces shared by the Bastion crates.
//!
//! - [`HttpError`]: structured JSON failure responses.
//! - [`config::BastionConfig`]: layered YAML / `.env` / environment configuration.
//! - [`layers`]: tracing subscriber and HTTP trace layer setup.

pub mod config;
pub mod error;
pub mod http;
pub mod layers;

pub use config::{BastionConfig, ConfigError, ConfigValue, FromConfigValue};
pub use error::{error_response, HttpError};
pub use layers::{default_trace, init_tracing};
