//! Layered application configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. `application.yaml`
//! 2. `application-{profile}.yaml`
//! 3. `.env` then `.env.{profile}`, loaded into the process environment
//!    without replacing variables that are already set
//! 4. process environment variables, `SECURITY_JWT_AUDIENCE` standing for
//!    `security.jwt.audience`
//!
//! The profile comes from `BASTION_PROFILE` when set, else from the caller.

mod loader;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

pub use value::{ConfigValue, FromConfigValue};

use loader::Layers;

/// Environment variable that selects the active profile.
pub const PROFILE_ENV: &str = "BASTION_PROFILE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config key not found: {0}")]
    NotFound(String),
    #[error("Config type mismatch for '{key}': expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },
    /// A file could not be read or is not valid YAML.
    #[error("Config load error: {0}")]
    Load(String),
}

/// Flattened `dotted.key -> value` configuration for one profile.
#[derive(Debug, Clone)]
pub struct BastionConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl BastionConfig {
    /// Load every layer from the working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_in(Path::new("."), profile)
    }

    /// Load every layer, reading files from `dir`. Missing files are skipped.
    pub fn load_in(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());

        let mut layers = Layers::default();
        layers.yaml_file(&dir.join("application.yaml"))?;
        layers.yaml_file(&dir.join(format!("application-{profile}.yaml")))?;

        for env_file in [dir.join(".env"), dir.join(format!(".env.{profile}"))] {
            if let Err(e) = dotenvy::from_path(&env_file) {
                if !e.not_found() {
                    return Err(ConfigError::Load(format!("{}: {e}", env_file.display())));
                }
            }
        }
        layers.environment();

        debug!(%profile, keys = layers.values.len(), dir = %dir.display(), "Configuration loaded");
        Ok(Self {
            values: layers.values,
            profile,
        })
    }

    /// A single YAML document, without files or environment.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut layers = Layers::default();
        layers.yaml_str(yaml)?;
        Ok(Self {
            values: layers.values,
            profile: profile.to_string(),
        })
    }

    /// No values, profile `test`.
    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        match self.values.get(key) {
            Some(value) => V::from_config_value(value, key),
            None => Err(ConfigError::NotFound(key.to_string())),
        }
    }

    /// `Ok(None)` when the key is absent; a present value of the wrong type
    /// is still an error.
    pub fn get_opt<V: FromConfigValue>(&self, key: &str) -> Result<Option<V>, ConfigError> {
        if !self.values.contains_key(key) {
            return Ok(None);
        }
        self.get(key).map(Some)
    }

    /// Falls back to `default` when the key is absent or does not convert.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }
}
