use std::sync::atomic::Ordering;

use axum::routing::{get, post};
use bastion_core::http::{from_fn_with_state, Json, Method, Router, State};
use bastion_core::{default_trace, HttpError};
use bastion_security::{
    authorize, AuthPolicy, Authenticated, Authorizer, EndpointPolicy, PolicyTable, ResolvedToken,
    RouteGroup, TokenInfo, TokenRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub account_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

async fn health() -> &'static str {
    "OK"
}

/// Issues a token for whoever asks. Stands in for a real credential check.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let mut request = TokenRequest::new(body.account_id).admin(body.admin);
    request.username = body.username;
    request.email = body.email;

    let token = state.jwt.generate_jwt(&request)?;
    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt.config().lifetime_secs(),
    }))
}

async fn me(Authenticated(token): Authenticated) -> Json<TokenInfo> {
    Json(token)
}

async fn feed(resolved: ResolvedToken) -> Json<Value> {
    let audience = match resolved.token() {
        Some(token) => token.username.clone().unwrap_or_else(|| token.account_id.clone()),
        None => "anonymous".to_string(),
    };
    Json(json!({ "audience": audience }))
}

async fn stats(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "authentications": state.authentications.load(Ordering::Relaxed),
    }))
}

/// Route policies, kept next to the routes they describe.
pub fn policies() -> PolicyTable {
    PolicyTable::new()
        .route(Method::GET, "/health", EndpointPolicy::no_auth())
        .route(Method::POST, "/login", EndpointPolicy::no_auth())
        .route(Method::GET, "/me", EndpointPolicy::standard())
        .route(Method::GET, "/feed", EndpointPolicy::optional())
        .group(
            RouteGroup::new("/admin", AuthPolicy::ADMIN_TOKEN)
                .route(Method::GET, "/stats", EndpointPolicy::undeclared()),
        )
}

pub fn app(state: AppState) -> Router {
    let authorizer = Authorizer::new(state.jwt.clone(), policies());

    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/feed", get(feed))
        .route("/admin/stats", get(stats))
        .route_layer(from_fn_with_state(authorizer, authorize))
        .layer(default_trace())
        .with_state(state)
}
