use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bastion_core::BastionConfig;
use bastion_security::{AuthConfigBuilder, ConfigurationError, JwtService};
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtService,
    pub authentications: Arc<AtomicU64>,
}

impl AppState {
    /// Build the token service from `config`, counting successful
    /// authentications through an observer.
    pub fn from_config(config: &BastionConfig) -> Result<Self, ConfigurationError> {
        let authentications = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&authentications);

        let jwt = AuthConfigBuilder::from_config(config)
            .on_authenticated(move |token| {
                let total = counter.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(sub = %token.account_id, total, "Authenticated");
                Ok(())
            })
            .build()?;

        Ok(Self {
            jwt: JwtService::new(jwt),
            authentications,
        })
    }
}
