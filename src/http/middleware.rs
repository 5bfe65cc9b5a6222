//! Enforcement middleware.
//!
//! Wraps any axum `Router`: evaluates each request before the inner
//! service runs and post-processes encrypted responses on the way out.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::enforcer::{Enforcer, Outcome};
use crate::http::request::RequestView;
use crate::http::response::bad_request;
use crate::observability::metrics;

/// State shared by every invocation of [`enforce_scheme`].
#[derive(Clone)]
pub struct EnforcerState {
    pub enforcer: Arc<Enforcer>,
    /// Deployment environment matched by `only_environments`/`except_environments`.
    pub environment: Option<Arc<str>>,
}

impl EnforcerState {
    pub fn new(enforcer: Enforcer, environment: Option<&str>) -> Self {
        Self {
            enforcer: Arc::new(enforcer),
            environment: environment.map(Arc::from),
        }
    }
}

/// Layer the enforcer over `router`.
pub fn enforce<S>(router: Router<S>, state: EnforcerState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, enforce_scheme))
}

pub async fn enforce_scheme(
    State(state): State<EnforcerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let view = RequestView::from_request(&request, state.environment.as_deref());

    match state.enforcer.evaluate(&view) {
        Outcome::Ignored => {
            metrics::record_ignored();
            tracing::trace!(path = %view.path(), "Request ignored by enforcer");
            next.run(request).await
        }
        Outcome::Redirect(redirect) => {
            metrics::record_redirect(redirect.scheme);
            tracing::debug!(
                method = %view.method(),
                from = %view.scheme(),
                host = %view.host(),
                location = %redirect.location,
                status = redirect.status.as_u16(),
                "Redirecting request"
            );
            redirect.into_response()
        }
        Outcome::Rejected(e) => {
            metrics::record_bad_redirect();
            tracing::warn!(
                error = %e,
                host = %view.host(),
                path = %view.path(),
                "Cannot build redirect location"
            );
            bad_request()
        }
        Outcome::Forward { encrypted } => {
            metrics::record_passthrough(encrypted);
            let mut response = next.run(request).await;
            if encrypted {
                state.enforcer.post_process(response.headers_mut());
            }
            response
        }
    }
}
