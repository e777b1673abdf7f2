use bastion_core::http::Method;
use bastion_security::{AuthPolicy, EndpointPolicy, PolicyTable, RouteGroup};

// ── Flags ──

#[test]
fn flag_bits() {
    assert_eq!(AuthPolicy::PERMISSIONS.bits(), 0b0001);
    assert_eq!(AuthPolicy::STANDARD_TOKEN.bits(), 0b0010);
    assert_eq!(AuthPolicy::ADMIN_TOKEN.bits(), 0b0110);
    assert_eq!(AuthPolicy::SECRET.bits(), 0b1110);
    assert_eq!(AuthPolicy::OPTIONAL.bits(), 0b1111);
}

#[test]
fn stricter_flags_imply_weaker_ones() {
    assert!(AuthPolicy::ADMIN_TOKEN.contains(AuthPolicy::STANDARD_TOKEN));
    assert!(AuthPolicy::SECRET.contains(AuthPolicy::ADMIN_TOKEN));
    assert!(!AuthPolicy::STANDARD_TOKEN.contains(AuthPolicy::ADMIN_TOKEN));
}

#[test]
fn secret_with_permissions_reads_as_optional() {
    assert_eq!(AuthPolicy::SECRET | AuthPolicy::PERMISSIONS, AuthPolicy::OPTIONAL);
    let policy = EndpointPolicy::require(AuthPolicy::SECRET | AuthPolicy::PERMISSIONS);
    assert!(policy.is_optional());
    assert!(!policy.requires_admin());
}

// ── Endpoint policy ──

#[test]
fn undeclared_is_optional_and_unconfigured() {
    let policy = EndpointPolicy::undeclared();
    assert!(policy.is_unconfigured());
    assert!(policy.is_optional());
    assert!(!policy.requires_admin());
}

#[test]
fn no_auth_is_optional_but_configured() {
    let policy = EndpointPolicy::no_auth();
    assert!(!policy.is_unconfigured());
    assert!(policy.is_exempt());
    assert!(policy.is_optional());
}

#[test]
fn standard_requires_a_token_only() {
    let policy = EndpointPolicy::standard();
    assert!(!policy.is_optional());
    assert!(!policy.requires_admin());
}

#[test]
fn admin_and_secret_require_admin() {
    assert!(EndpointPolicy::admin().requires_admin());
    assert!(EndpointPolicy::require(AuthPolicy::SECRET).requires_admin());
}

#[test]
fn permissions_alone_requires_a_token() {
    let policy = EndpointPolicy::require(AuthPolicy::PERMISSIONS);
    assert!(!policy.is_optional());
    assert!(!policy.requires_admin());
}

#[test]
fn optional_never_requires_admin() {
    let policy = EndpointPolicy::optional();
    assert!(policy.is_optional());
    assert!(!policy.requires_admin());
}

#[test]
fn merge_only_adds_restrictions() {
    let merged = EndpointPolicy::admin().merge(EndpointPolicy::standard());
    assert_eq!(merged.flags(), AuthPolicy::ADMIN_TOKEN);
    assert!(merged.requires_admin());
}

// ── Table ──

#[test]
fn lookup_by_method_and_pattern() {
    let table = PolicyTable::new()
        .route(Method::GET, "/orders/{id}", EndpointPolicy::standard())
        .route(Method::DELETE, "/orders/{id}", EndpointPolicy::admin());

    assert_eq!(table.len(), 2);
    assert_eq!(table.lookup(&Method::GET, "/orders/{id}"), EndpointPolicy::standard());
    assert_eq!(table.lookup(&Method::DELETE, "/orders/{id}"), EndpointPolicy::admin());
    assert_eq!(table.lookup(&Method::POST, "/orders/{id}"), EndpointPolicy::undeclared());
    assert_eq!(table.lookup(&Method::GET, "/orders/42"), EndpointPolicy::undeclared());
}

#[test]
fn registering_twice_merges() {
    let table = PolicyTable::new()
        .route(Method::GET, "/feed", EndpointPolicy::standard())
        .route(Method::GET, "/feed", EndpointPolicy::admin());
    assert_eq!(table.len(), 1);
    assert!(table.lookup(&Method::GET, "/feed").requires_admin());
}

#[test]
fn group_policy_applies_to_every_route() {
    let table = PolicyTable::new().group(
        RouteGroup::new("/admin", AuthPolicy::ADMIN_TOKEN)
            .route(Method::GET, "/users", EndpointPolicy::undeclared())
            .route(Method::POST, "/users", EndpointPolicy::standard()),
    );

    let list = table.lookup(&Method::GET, "/admin/users");
    assert!(list.is_declared());
    assert!(list.requires_admin());
    assert!(table.lookup(&Method::POST, "/admin/users").requires_admin());
}

#[test]
fn group_route_can_be_exempted() {
    let table = PolicyTable::new().group(
        RouteGroup::new("/admin", AuthPolicy::ADMIN_TOKEN)
            .route(Method::GET, "/status", EndpointPolicy::no_auth()),
    );
    let status = table.lookup(&Method::GET, "/admin/status");
    assert!(status.is_optional());
    assert!(!status.requires_admin());
}

#[test]
fn unrestricted_group_only_shares_prefix() {
    let table = PolicyTable::new().group(
        RouteGroup::unrestricted("/api/")
            .route(Method::GET, "/me", EndpointPolicy::standard())
            .route(Method::GET, "/docs", EndpointPolicy::undeclared()),
    );
    assert_eq!(table.lookup(&Method::GET, "/api/me"), EndpointPolicy::standard());
    assert!(table.lookup(&Method::GET, "/api/docs").is_unconfigured());
    assert_eq!(table.iter().count(), 2);
}
