//! Construction-mode redirect middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::gate::{evaluate, GateDecision};
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn site_mode_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match evaluate(&state.site_mode, request.uri().path()) {
        GateDecision::Pass => next.run(request).await,
        GateDecision::Redirect(target) => {
            tracing::debug!(
                path = %request.uri().path(),
                target = %target,
                "Site under construction, redirecting"
            );
            metrics::record_gate_redirect();
            Redirect::temporary(&target).into_response()
        }
    }
}
