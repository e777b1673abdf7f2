use bastion_core::HttpError;
use bastion_security::{ErrorKind, ObserverError, SecurityError};

#[test]
fn kinds() {
    assert_eq!(SecurityError::InvalidValue { field: "account_id" }.kind(), ErrorKind::InvalidValue);
    assert_eq!(SecurityError::NotConfigured("x".into()).kind(), ErrorKind::NotConfigured);
    assert_eq!(SecurityError::InvalidToken("x".into()).kind(), ErrorKind::InvalidToken);
    assert_eq!(SecurityError::MissingClaim("sub").kind(), ErrorKind::InvalidToken);
    assert_eq!(SecurityError::NotYetValid { remaining: 5 }.kind(), ErrorKind::InvalidToken);
    assert_eq!(SecurityError::ExpiredToken { expired_for: 5 }.kind(), ErrorKind::ExpiredToken);
    assert_eq!(SecurityError::from(ObserverError::new("x")).kind(), ErrorKind::Observer);
}

#[test]
fn invalid_token_is_not_authenticated() {
    let http = HttpError::from(SecurityError::InvalidToken("bad signature".into()));
    assert_eq!(http.code(), "not_authenticated");
    // Internal detail stays out of the public message.
    assert!(!http.to_string().contains("bad signature"));
}

#[test]
fn expired_token_asks_for_reauthentication() {
    let http = HttpError::from(SecurityError::ExpiredToken { expired_for: 10 });
    assert_eq!(http.code(), "token_expired");
    assert_eq!(http.status().as_u16(), 403);
}

#[test]
fn missing_value_is_bad_request() {
    let http = HttpError::from(SecurityError::InvalidValue { field: "account_id" });
    assert_eq!(http.code(), "bad_request");
    assert_eq!(http.status().as_u16(), 400);
}

#[test]
fn configuration_problems_are_internal() {
    let http = HttpError::from(SecurityError::NotConfigured("no key".into()));
    assert_eq!(http.code(), "internal_error");
    assert_eq!(http.status().as_u16(), 500);

    let http = HttpError::from(SecurityError::from(ObserverError::new("audit down")));
    assert_eq!(http.code(), "internal_error");
}
