mod common;

use bastion_security::{TokenInfo, TokenRequest};
use common::{clock, service, service_at, NOW};
use serde_json::json;

fn sample() -> TokenInfo {
    TokenInfo {
        raw_jwt: Some("header.payload.signature".into()),
        account_id: "abc123".into(),
        email: Some("jane@example.com".into()),
        jwt_id: "4b2c0f4e-8a5d-4d0e-9f0e-0a1b2c3d4e5f".into(),
        audience: "orders".into(),
        issuer: "https://auth.bastion.test".into(),
        issued_at: NOW,
        expiration: NOW + 3600,
        ..TokenInfo::default()
    }
}

// ── JSON view ──

#[test]
fn serializes_camel_case_without_raw_jwt() {
    let value = serde_json::to_value(sample()).unwrap();
    assert_eq!(
        value,
        json!({
            "accountId": "abc123",
            "email": "jane@example.com",
            "jwtId": "4b2c0f4e-8a5d-4d0e-9f0e-0a1b2c3d4e5f",
            "audience": "orders",
            "issuer": "https://auth.bastion.test",
            "issuedAt": NOW,
            "expiration": NOW + 3600
        })
    );
}

#[test]
fn serializes_flags_when_set() {
    let token = TokenInfo {
        permission_set: 5,
        is_admin: true,
        valid_from: Some(NOW + 60),
        ..sample()
    };
    let value = serde_json::to_value(token).unwrap();
    assert_eq!(value["permissions"], 5);
    assert_eq!(value["isAdmin"], true);
    assert_eq!(value["validFrom"], NOW + 60);
}

#[test]
fn deserializes_without_optional_fields() {
    let token: TokenInfo = serde_json::from_value(json!({
        "accountId": "abc123",
        "jwtId": "id",
        "audience": "orders",
        "issuer": "me",
        "issuedAt": 1,
        "expiration": 2
    }))
    .unwrap();
    assert_eq!(token.account_id, "abc123");
    assert_eq!(token.permission_set, 0);
    assert!(!token.is_admin);
    assert!(token.raw_jwt.is_none());
}

// ── Derived values ──

#[test]
fn expiry_is_inclusive() {
    let token = sample();
    assert!(!token.is_expired_at(NOW));
    assert!(!token.is_expired_at(NOW + 3599));
    assert!(token.is_expired_at(NOW + 3600));
    assert!(token.is_expired_at(NOW + 4000));
}

#[test]
fn seconds_remaining_never_negative() {
    let token = sample();
    assert_eq!(token.seconds_remaining_at(NOW), 3600);
    assert_eq!(token.seconds_remaining_at(NOW + 3600), 0);
    assert_eq!(token.seconds_remaining_at(NOW + 9000), 0);
}

// ── to_jwt / from_jwt ──

#[test]
fn to_jwt_returns_existing_raw_jwt() {
    let service = service();
    let mut token = sample();
    assert_eq!(token.to_jwt(&service).unwrap(), "header.payload.signature");
}

#[test]
fn to_jwt_is_idempotent_after_validation() {
    let service = service();
    let jwt = service.generate_jwt(&TokenRequest::new("user-1")).unwrap();
    let mut token = TokenInfo::from_jwt(&jwt, &service).unwrap();
    assert_eq!(token.to_jwt(&service).unwrap(), jwt);
    assert_eq!(token.to_jwt(&service).unwrap(), jwt);
}

#[test]
fn to_jwt_issues_from_model_fields() {
    let clock = clock();
    let service = service_at(&clock);
    let mut token = TokenInfo {
        raw_jwt: None,
        permission_set: 5,
        is_admin: true,
        ..sample()
    };

    let jwt = token.to_jwt(&service).unwrap().to_string();
    assert_eq!(token.raw_jwt.as_deref(), Some(jwt.as_str()));

    let decoded = TokenInfo::from_jwt(&jwt, &service).unwrap();
    assert_eq!(decoded.account_id, "abc123");
    assert_eq!(decoded.email.as_deref(), Some("jane@example.com"));
    assert_eq!(decoded.permission_set, 5);
    assert!(decoded.is_admin);
    assert_eq!(decoded.audience, common::AUDIENCE);
}

#[test]
fn try_from_jwt_on_model() {
    let service = service();
    assert!(TokenInfo::try_from_jwt(Some("garbage"), &service).is_none());
    let jwt = service.generate_jwt(&TokenRequest::new("user-1")).unwrap();
    assert!(TokenInfo::try_from_jwt(Some(&jwt), &service).is_some());
}

// ── TokenRequest ──

#[test]
fn request_builder_sets_fields() {
    let request = TokenRequest::new("abc123")
        .username("jdoe")
        .email("jane@example.com")
        .first_name("Jane")
        .last_name("Doe")
        .permissions(5)
        .admin(true)
        .delay(60);
    assert_eq!(request.account_id, "abc123");
    assert_eq!(request.username.as_deref(), Some("jdoe"));
    assert_eq!(request.last_name.as_deref(), Some("Doe"));
    assert_eq!(request.permissions, 5);
    assert!(request.is_admin);
    assert_eq!(request.delay_secs, 60);
}

#[test]
fn request_defaults() {
    let request = TokenRequest::new("abc123");
    assert_eq!(request.permissions, 0);
    assert!(!request.is_admin);
    assert_eq!(request.delay_secs, 0);
    assert!(request.email.is_none());
}
