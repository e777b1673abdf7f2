//! A small service wiring the Bastion pieces together: configuration,
//! token issuance, the policy table and the authorization middleware.

pub mod routes;
pub mod state;

pub use routes::app;
pub use state::AppState;
