use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bastion_core::config::{BastionConfig, ConfigError, FromConfigValue};
use tracing::{info, warn};

use crate::error::{ConfigurationError, ObserverError};
use crate::keys::{self, KeyPair};
use crate::signer::{Signer, Verifier};
use crate::token::TokenInfo;

/// Callback run after every successful validation.
///
/// Observers run synchronously on the validating task, in registration order.
/// They must not block.
pub type Observer = Arc<dyn Fn(&TokenInfo) -> Result<(), ObserverError> + Send + Sync>;

/// Signing and validation settings, fixed once built.
///
/// Obtain one through [`JwtConfiguration::builder`]. Key material is parsed
/// during [`AuthConfigBuilder::build`] and reused by every call afterwards.
pub struct JwtConfiguration {
    audience: String,
    issuer: String,
    lifetime_secs: i64,
    public_key_pem: String,
    signer: Signer,
    verifier: Verifier,
    observers: Vec<Observer>,
    isolate_observers: bool,
    enforce_not_before: bool,
    ephemeral: bool,
}

impl JwtConfiguration {
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// The verification key, for publishing to other services.
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    pub fn observers(&self) -> &[Observer] {
        &self.observers
    }

    /// When set, a failing observer is logged and the remaining observers
    /// still run. Otherwise the first failure aborts validation.
    pub fn isolates_observers(&self) -> bool {
        self.isolate_observers
    }

    /// Whether tokens are rejected before their `nbf` time.
    pub fn enforces_not_before(&self) -> bool {
        self.enforce_not_before
    }

    /// Whether the key pair was generated at startup rather than supplied.
    pub fn uses_ephemeral_keys(&self) -> bool {
        self.ephemeral
    }

    pub(crate) fn signer(&self) -> &Signer {
        &self.signer
    }

    pub(crate) fn verifier(&self) -> &Verifier {
        &self.verifier
    }
}

impl fmt::Debug for JwtConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfiguration")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("lifetime_secs", &self.lifetime_secs)
            .field("observers", &self.observers.len())
            .field("isolate_observers", &self.isolate_observers)
            .field("enforce_not_before", &self.enforce_not_before)
            .field("ephemeral", &self.ephemeral)
            .finish_non_exhaustive()
    }
}

/// Builder for [`JwtConfiguration`].
///
/// Each setter takes effect once. Calling it again logs a warning and leaves
/// the first value in place. [`on_authenticated`](Self::on_authenticated) is
/// the exception and accumulates observers.
///
/// ```rust,ignore
/// let config = JwtConfiguration::builder()
///     .audience("orders")
///     .issuer("https://auth.example.com")
///     .lifetime(3600)
///     .keys(private_pem, public_pem)
///     .on_authenticated(|token| {
///         tracing::info!(sub = %token.account_id, "login");
///         Ok(())
///     })
///     .build()?;
/// ```
#[derive(Default)]
pub struct AuthConfigBuilder {
    called: HashSet<&'static str>,
    audience: Option<String>,
    issuer: Option<String>,
    lifetime_secs: Option<i64>,
    private_key_pem: Option<String>,
    public_key_pem: Option<String>,
    ephemeral: bool,
    isolate_observers: bool,
    enforce_not_before: bool,
    observers: Vec<Observer>,
    /// Problems found before `build()`, e.g. unreadable key files.
    pending: Vec<String>,
}

impl AuthConfigBuilder {
    /// Seed a builder from the `security.jwt.*` keys of an application config.
    ///
    /// | key | meaning |
    /// |-----|---------|
    /// | `security.jwt.audience` | audience stamped into and required of tokens |
    /// | `security.jwt.issuer` | issuer stamped into tokens |
    /// | `security.jwt.lifetime` | token lifetime in seconds |
    /// | `security.jwt.keys.private` / `.public` | inline PEM keys |
    /// | `security.jwt.keys.privatefile` / `.publicfile` | PEM key file paths |
    /// | `security.jwt.keys.ephemeral` | generate a key pair at startup |
    /// | `security.jwt.enforcenbf` | reject tokens before their `nbf` |
    ///
    /// Missing keys are left unset so that `build()` reports them together
    /// with anything else that is wrong.
    pub fn from_config(config: &BastionConfig) -> Self {
        let mut builder = Self::default();

        if let Some(audience) = builder.read::<String>(config, "security.jwt.audience") {
            builder = builder.audience(audience);
        }
        if let Some(issuer) = builder.read::<String>(config, "security.jwt.issuer") {
            builder = builder.issuer(issuer);
        }
        if let Some(lifetime) = builder.read::<i64>(config, "security.jwt.lifetime") {
            builder = builder.lifetime(lifetime);
        }

        let inline = (
            builder.read::<String>(config, "security.jwt.keys.private"),
            builder.read::<String>(config, "security.jwt.keys.public"),
        );
        let files = (
            builder.read::<String>(config, "security.jwt.keys.privatefile"),
            builder.read::<String>(config, "security.jwt.keys.publicfile"),
        );
        match (inline, files) {
            ((Some(private), Some(public)), _) => builder = builder.keys(private, public),
            (_, (Some(private), Some(public))) => {
                builder = builder.keys_from_files(private, public)
            }
            ((private, public), (private_file, public_file)) => {
                // At most half a pair; keep it so build() names the missing half.
                let private = match (private, private_file) {
                    (Some(pem), _) => Some(pem),
                    (None, Some(path)) => builder.read_pem(Path::new(&path)),
                    (None, None) => None,
                };
                let public = match (public, public_file) {
                    (Some(pem), _) => Some(pem),
                    (None, Some(path)) => builder.read_pem(Path::new(&path)),
                    (None, None) => None,
                };
                builder.private_key_pem = private;
                builder.public_key_pem = public;
            }
        }

        if builder
            .read::<bool>(config, "security.jwt.keys.ephemeral")
            .unwrap_or(false)
        {
            builder = builder.use_ephemeral_keys();
        }
        if let Some(enforce) = builder.read::<bool>(config, "security.jwt.enforcenbf") {
            builder = builder.enforce_not_before(enforce);
        }

        builder
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        if self.first_call("audience") {
            self.audience = Some(audience.into());
        }
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        if self.first_call("issuer") {
            self.issuer = Some(issuer.into());
        }
        self
    }

    /// Token lifetime in seconds. Must be positive.
    pub fn lifetime(mut self, secs: i64) -> Self {
        if self.first_call("lifetime") {
            self.lifetime_secs = Some(secs);
        }
        self
    }

    /// PEM private key (PKCS#1 or PKCS#8) and matching PEM public key.
    pub fn keys(mut self, private_pem: impl Into<String>, public_pem: impl Into<String>) -> Self {
        if self.first_call("keys") {
            self.private_key_pem = Some(private_pem.into());
            self.public_key_pem = Some(public_pem.into());
        }
        self
    }

    /// Like [`keys`](Self::keys), reading each PEM from a file.
    pub fn keys_from_files(
        mut self,
        private_path: impl AsRef<Path>,
        public_path: impl AsRef<Path>,
    ) -> Self {
        if self.first_call("keys") {
            self.private_key_pem = self.read_pem(private_path.as_ref());
            self.public_key_pem = self.read_pem(public_path.as_ref());
        }
        self
    }

    /// Generate a throwaway RSA key pair at build time.
    ///
    /// Tokens signed with it do not validate on other instances or after a
    /// restart. Not for production.
    pub fn use_ephemeral_keys(mut self) -> Self {
        if self.first_call("use_ephemeral_keys") {
            self.ephemeral = true;
        }
        self
    }

    /// Register an observer. May be called any number of times.
    pub fn on_authenticated<F>(mut self, observer: F) -> Self
    where
        F: Fn(&TokenInfo) -> Result<(), ObserverError> + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Keep running observers after one fails, logging the failure.
    pub fn isolate_observers(mut self, isolate: bool) -> Self {
        if self.first_call("isolate_observers") {
            self.isolate_observers = isolate;
        }
        self
    }

    /// Reject tokens whose `nbf` lies in the future.
    pub fn enforce_not_before(mut self, enforce: bool) -> Self {
        if self.first_call("enforce_not_before") {
            self.enforce_not_before = enforce;
        }
        self
    }

    /// Validate everything and freeze the configuration.
    ///
    /// All problems are collected and reported together.
    pub fn build(self) -> Result<JwtConfiguration, ConfigurationError> {
        let mut errors = self.pending;

        let audience = self.audience.unwrap_or_default();
        if audience.trim().is_empty() {
            errors.push("Server audience is required.".into());
        }
        let issuer = self.issuer.unwrap_or_default();
        if issuer.trim().is_empty() {
            errors.push("Server issuer is required.".into());
        }
        let lifetime_secs = self.lifetime_secs.unwrap_or_default();
        if lifetime_secs < 1 {
            errors.push("Token lifetime must be greater than 0 seconds.".into());
        }

        let supplied = (
            self.private_key_pem.filter(|pem| !pem.trim().is_empty()),
            self.public_key_pem.filter(|pem| !pem.trim().is_empty()),
        );
        let (private_pem, public_pem) = match (self.ephemeral, supplied) {
            (true, (None, None)) => match KeyPair::generate() {
                Ok(pair) => {
                    warn!(
                        "Using an ephemeral RSA key pair. Tokens will not validate on other \
                         instances or after a restart; configure security.jwt.keys for production"
                    );
                    (Some(pair.private_pem), Some(pair.public_pem))
                }
                Err(e) => {
                    errors.push(e.to_string());
                    (None, None)
                }
            },
            (true, _) => {
                errors.push("Ephemeral keys cannot be combined with a configured key.".into());
                (None, None)
            }
            (false, (private, public)) => {
                if private.is_none() {
                    errors.push("Private key is required.".into());
                }
                if public.is_none() {
                    errors.push("Public key is required.".into());
                }
                (private, public)
            }
        };

        let parsed_private = private_pem.as_deref().and_then(|pem| {
            keys::parse_private_key(pem)
                .map_err(|e| errors.push(e.to_string()))
                .ok()
        });
        let parsed_public = public_pem.as_deref().and_then(|pem| {
            keys::parse_public_key(pem)
                .map_err(|e| errors.push(e.to_string()))
                .ok()
        });
        if let (Some(private), Some(public)) = (&parsed_private, &parsed_public) {
            if !keys::is_pair(private, public) {
                errors.push("Public key does not match the private key.".into());
            }
        }

        let signer = parsed_private.as_ref().and_then(|key| {
            Signer::from_key(key)
                .map_err(|e| errors.push(e.to_string()))
                .ok()
        });
        let verifier = parsed_public.as_ref().and_then(|key| {
            Verifier::from_key(key)
                .map_err(|e| errors.push(e.to_string()))
                .ok()
        });

        if !errors.is_empty() {
            errors.dedup();
            return Err(ConfigurationError { errors });
        }
        let (Some(signer), Some(verifier), Some(public_key_pem)) = (signer, verifier, public_pem)
        else {
            return Err(ConfigurationError {
                errors: vec!["Key material is incomplete.".into()],
            });
        };

        info!(
            audience = %audience,
            issuer = %issuer,
            lifetime_secs,
            observers = self.observers.len(),
            "JWT configuration ready"
        );

        Ok(JwtConfiguration {
            audience,
            issuer,
            lifetime_secs,
            public_key_pem,
            signer,
            verifier,
            observers: self.observers,
            isolate_observers: self.isolate_observers,
            enforce_not_before: self.enforce_not_before,
            ephemeral: self.ephemeral,
        })
    }

    fn first_call(&mut self, method: &'static str) -> bool {
        if self.called.insert(method) {
            return true;
        }
        warn!(
            method,
            "Configuration builder method already called; each method can only be called once \
             and subsequent calls are ignored"
        );
        false
    }

    fn read<V: FromConfigValue>(&mut self, config: &BastionConfig, key: &str) -> Option<V> {
        match config.get_opt::<V>(key) {
            Ok(value) => value,
            Err(e @ ConfigError::TypeMismatch { .. }) | Err(e @ ConfigError::Load(_)) => {
                self.pending.push(e.to_string());
                None
            }
            Err(ConfigError::NotFound(_)) => None,
        }
    }

    fn read_pem(&mut self, path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(pem) => Some(pem),
            Err(e) => {
                self.pending
                    .push(format!("Cannot read key file {}: {e}", path.display()));
                None
            }
        }
    }
}
