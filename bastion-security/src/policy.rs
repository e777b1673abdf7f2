use std::collections::HashMap;

use bastion_core::http::Method;
use bitflags::bitflags;

bitflags! {
    /// Authorization requirements, combined with `|`.
    ///
    /// Stricter policies include the bits of the ones below them:
    /// `ADMIN_TOKEN` contains `STANDARD_TOKEN`, `SECRET` contains
    /// `ADMIN_TOKEN`. `OPTIONAL` sets every bit, so `SECRET | PERMISSIONS`
    /// reads as `OPTIONAL`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuthPolicy: u8 {
        /// Reserved for permission-mask checks. Not evaluated yet.
        const PERMISSIONS = 0b0001;
        const STANDARD_TOKEN = 0b0010;
        const ADMIN_TOKEN = 0b0110;
        const SECRET = 0b1110;
        /// Evaluate the token if present, never block.
        const OPTIONAL = 0b1111;
    }
}

/// What one endpoint declares about authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointPolicy {
    flags: AuthPolicy,
    declared: bool,
    exempt: bool,
}

impl Default for EndpointPolicy {
    fn default() -> Self {
        Self::undeclared()
    }
}

impl EndpointPolicy {
    /// Nothing declared. Evaluated as unrestricted, with a warning.
    pub const fn undeclared() -> Self {
        Self {
            flags: AuthPolicy::empty(),
            declared: false,
            exempt: false,
        }
    }

    pub const fn require(flags: AuthPolicy) -> Self {
        Self {
            flags,
            declared: true,
            exempt: false,
        }
    }

    /// A valid token of any kind.
    pub const fn standard() -> Self {
        Self::require(AuthPolicy::STANDARD_TOKEN)
    }

    pub const fn admin() -> Self {
        Self::require(AuthPolicy::ADMIN_TOKEN)
    }

    pub const fn optional() -> Self {
        Self::require(AuthPolicy::OPTIONAL)
    }

    /// Explicitly open to everyone.
    pub const fn no_auth() -> Self {
        Self {
            flags: AuthPolicy::empty(),
            declared: false,
            exempt: true,
        }
    }

    /// Union of two declarations. Flags only ever accumulate.
    pub fn merge(self, other: EndpointPolicy) -> Self {
        Self {
            flags: self.flags | other.flags,
            declared: self.declared || other.declared,
            exempt: self.exempt || other.exempt,
        }
    }

    pub fn flags(&self) -> AuthPolicy {
        self.flags
    }

    pub fn is_declared(&self) -> bool {
        self.declared
    }

    pub fn is_exempt(&self) -> bool {
        self.exempt
    }

    /// Neither a requirement nor an exemption was declared.
    pub fn is_unconfigured(&self) -> bool {
        !self.declared && !self.exempt
    }

    /// Whether a request without a valid token may proceed.
    pub fn is_optional(&self) -> bool {
        self.flags.contains(AuthPolicy::OPTIONAL) || self.exempt || !self.declared
    }

    /// Whether a valid token must also carry the admin flag.
    pub fn requires_admin(&self) -> bool {
        !self.is_optional() && self.flags.contains(AuthPolicy::ADMIN_TOKEN)
    }
}

/// Routes sharing a path prefix and a baseline policy.
///
/// The group's flags are OR-ed into every route it holds.
///
/// ```rust,ignore
/// let admin = RouteGroup::new("/admin", AuthPolicy::ADMIN_TOKEN)
///     .route(Method::GET, "/users", EndpointPolicy::undeclared())
///     .route(Method::DELETE, "/users/{id}", EndpointPolicy::require(AuthPolicy::SECRET));
/// ```
#[derive(Debug, Clone)]
pub struct RouteGroup {
    prefix: String,
    policy: EndpointPolicy,
    routes: Vec<(Method, String, EndpointPolicy)>,
}

impl RouteGroup {
    pub fn new(prefix: impl Into<String>, flags: AuthPolicy) -> Self {
        Self {
            prefix: prefix.into(),
            policy: EndpointPolicy::require(flags),
            routes: Vec::new(),
        }
    }

    /// A group that only shares a prefix.
    pub fn unrestricted(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            policy: EndpointPolicy::undeclared(),
            routes: Vec::new(),
        }
    }

    pub fn route(mut self, method: Method, path: &str, policy: EndpointPolicy) -> Self {
        self.routes.push((method, path.to_string(), policy));
        self
    }
}

/// Route-to-policy registry consulted by the authorization middleware.
///
/// Keys are an HTTP method plus the route *pattern* as registered with the
/// router (`/users/{id}`), not the concrete request path.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: HashMap<(Method, String), EndpointPolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. Registering the same route twice merges the policies.
    pub fn route(mut self, method: Method, path: &str, policy: EndpointPolicy) -> Self {
        self.insert(method, path.to_string(), policy);
        self
    }

    pub fn group(mut self, group: RouteGroup) -> Self {
        for (method, path, policy) in group.routes {
            let full = join_path(&group.prefix, &path);
            self.insert(method, full, group.policy.merge(policy));
        }
        self
    }

    /// Policy for a route; [`EndpointPolicy::undeclared`] when unknown.
    pub fn lookup(&self, method: &Method, path: &str) -> EndpointPolicy {
        self.entries
            .get(&(method.clone(), path.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Method, &str, &EndpointPolicy)> {
        self.entries
            .iter()
            .map(|((method, path), policy)| (method, path.as_str(), policy))
    }

    fn insert(&mut self, method: Method, path: String, policy: EndpointPolicy) {
        self.entries
            .entry((method, path))
            .and_modify(|existing| *existing = existing.merge(policy))
            .or_insert(policy);
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    match path.trim_start_matches('/') {
        "" if prefix.is_empty() => "/".to_string(),
        "" => prefix.to_string(),
        rest => format!("{prefix}/{rest}"),
    }
}
