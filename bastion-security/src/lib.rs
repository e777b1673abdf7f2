//! Token issuance, validation and per-route authorization for Bastion services.
//!
//! - [`JwtConfiguration`] is built once at startup and shared through
//!   [`JwtService`], which issues and validates RS256 tokens.
//! - PII claims are masked inside the token ([`masking`]).
//! - [`PolicyTable`] maps routes to [`AuthPolicy`] flags; the [`authorize`]
//!   middleware enforces them and hands the resolved token to handlers.
//! - [`dangerous`] decodes tokens without verifying them, for logging only.

pub mod clock;
pub mod config;
pub mod dangerous;
pub mod error;
pub mod evaluator;
pub mod extractor;
pub mod jwt;
pub mod keys;
pub mod masking;
pub mod middleware;
pub mod policy;
pub mod signer;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AuthConfigBuilder, JwtConfiguration, Observer};
pub use error::{ConfigurationError, ErrorKind, ObserverError, SecurityError};
pub use evaluator::{AuthRejection, Evaluation, PolicyEvaluator};
pub use extractor::{bearer_from_headers, extract_bearer, Authenticated, ResolvedToken};
pub use jwt::JwtService;
pub use keys::KeyPair;
pub use middleware::{authorize, Authorizer};
pub use policy::{AuthPolicy, EndpointPolicy, PolicyTable, RouteGroup};
pub use signer::{Claims, Signer, Verifier};
pub use token::{TokenInfo, TokenRequest};

pub mod prelude {
    //! Re-exports of the most commonly used security types.
    pub use crate::{
        authorize, AuthConfigBuilder, AuthPolicy, Authenticated, Authorizer, EndpointPolicy,
        JwtConfiguration, JwtService, PolicyTable, ResolvedToken, RouteGroup, SecurityError,
        TokenInfo, TokenRequest,
    };
}
