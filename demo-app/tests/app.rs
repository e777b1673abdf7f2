use axum::body::Body;
use axum::http::{Request, StatusCode};
use bastion_core::{BastionConfig, ConfigValue};
use demo_app::{app, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn state() -> AppState {
    let mut config = BastionConfig::empty();
    config.set("security.jwt.audience", ConfigValue::String("demo".into()));
    config.set("security.jwt.issuer", ConfigValue::String("demo-issuer".into()));
    config.set("security.jwt.lifetime", ConfigValue::Integer(600));
    config.set("security.jwt.keys.ephemeral", ConfigValue::Bool(true));
    AppState::from_config(&config).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(router: &axum::Router, body: Value) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["expiresIn"], 600);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_open() {
    let router = app(state());
    let response = router.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_then_me() {
    let router = app(state());
    let token = login(&router, json!({"accountId": "abc123", "email": "jane@example.com"})).await;

    let response = router.oneshot(get("/me", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["accountId"], "abc123");
    assert_eq!(body["email"], "jane@example.com");
    assert_eq!(body["audience"], "demo");
}

#[tokio::test]
async fn login_without_account_is_bad_request() {
    let router = app(state());
    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/json")
        .body(Body::from(json!({"accountId": ""}).to_string()))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "bad_request");
}

#[tokio::test]
async fn me_requires_a_token() {
    let router = app(state());
    let response = router.oneshot(get("/me", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["error"], "not_authenticated");
}

#[tokio::test]
async fn feed_is_optional() {
    let router = app(state());
    let anonymous = router.clone().oneshot(get("/feed", None)).await.unwrap();
    assert_eq!(json_body(anonymous).await["audience"], "anonymous");

    let token = login(&router, json!({"accountId": "abc123", "username": "jdoe"})).await;
    let known = router.oneshot(get("/feed", Some(&token))).await.unwrap();
    assert_eq!(json_body(known).await["audience"], "jdoe");
}

#[tokio::test]
async fn admin_stats_require_admin_and_count_authentications() {
    let state = state();
    let router = app(state.clone());
    let user = login(&router, json!({"accountId": "user-1"})).await;
    let admin = login(&router, json!({"accountId": "root", "admin": true})).await;

    let denied = router.clone().oneshot(get("/admin/stats", Some(&user))).await.unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(denied).await["error"], "not_authorized");

    let allowed = router.oneshot(get("/admin/stats", Some(&admin))).await.unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    // One validation for the rejected user request, one for this one.
    assert_eq!(json_body(allowed).await["authentications"], 2);
}
