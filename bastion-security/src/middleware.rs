use std::sync::Arc;

use bastion_core::http::header::AUTHORIZATION;
use bastion_core::http::{IntoResponse, MatchedPath, Next, Request, Response, State};
use bastion_core::HttpError;

use crate::evaluator::PolicyEvaluator;
use crate::extractor::ResolvedToken;
use crate::jwt::JwtService;
use crate::policy::PolicyTable;

/// State for the [`authorize`] middleware: a policy table and the service
/// used to validate bearer tokens.
#[derive(Clone)]
pub struct Authorizer {
    evaluator: PolicyEvaluator,
    policies: Arc<PolicyTable>,
}

impl Authorizer {
    pub fn new(service: JwtService, policies: PolicyTable) -> Self {
        Self {
            evaluator: PolicyEvaluator::new(service),
            policies: Arc::new(policies),
        }
    }

    pub fn service(&self) -> &JwtService {
        self.evaluator.service()
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }
}

/// Evaluate the matched route's policy before the handler runs.
///
/// Install with `route_layer` so the matched route pattern is known:
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/me", get(me))
///     .route_layer(from_fn_with_state(authorizer, authorize));
/// ```
///
/// When installed with a plain `layer` the request path stands in for the
/// pattern, which only works for routes without parameters.
pub async fn authorize(
    State(authorizer): State<Authorizer>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let route = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => request.uri().path().to_string(),
    };
    let endpoint = format!("{method} {route}");

    let policy = authorizer.policies.lookup(&method, &route);
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let evaluation = authorizer
        .evaluator
        .evaluate(&policy, authorization, &endpoint);
    let resolved = ResolvedToken(evaluation.token);

    match evaluation.outcome {
        Ok(()) => {
            request.extensions_mut().insert(resolved);
            next.run(request).await
        }
        Err(rejection) => {
            let mut response = HttpError::from(rejection).into_response();
            response.extensions_mut().insert(resolved);
            response
        }
    }
}
