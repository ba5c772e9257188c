//! Axum Middleware for Token Access Control
//!
//! Every request except those under the public prefix must carry the
//! configured token in `X-PORTA-TOKEN`. The decision itself lives in
//! `porta_gateway::AccessGuard`; this module binds it to axum.
//!
//! - missing or empty header: 401 `UNAUTHORIZED`
//! - wrong token: 401 `INVALID_TOKEN`

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use porta_gateway::{AccessDecision, AccessGuard, RejectReason, TOKEN_HEADER};

use crate::error::ApiError;
use crate::telemetry::METRICS;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct AccessMiddlewareState {
    pub guard: AccessGuard,
}

impl AccessMiddlewareState {
    pub fn new(guard: AccessGuard) -> Self {
        Self { guard }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Reject requests whose token does not satisfy the guard.
///
/// ```ignore
/// let state = AccessMiddlewareState::new(guard);
/// let app = Router::new()
///     .route("/meta", get(meta))
///     .layer(middleware::from_fn_with_state(state, access_middleware));
/// ```
pub async fn access_middleware(
    State(state): State<AccessMiddlewareState>,
    request: Request,
    next: Next,
) -> Result<Response, AccessMiddlewareError> {
    let path = request.uri().path().to_string();

    // Non-UTF-8 bytes become U+FFFD, so such a header can only ever be wrong.
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let decision = state.guard.authorize(&path, token.as_deref());

    match decision {
        AccessDecision::Allow => Ok(next.run(request).await),
        AccessDecision::Reject(reason) => {
            tracing::warn!(path = %path, reason = reason.as_str(), "Rejected request");
            if let Ok(metrics) = METRICS.as_ref() {
                metrics.record_auth_rejection(reason.as_str());
            }
            Err(AccessMiddlewareError(rejection_error(reason)))
        }
    }
}

fn rejection_error(reason: RejectReason) -> ApiError {
    match reason {
        RejectReason::Missing => ApiError::unauthorized(reason.message()),
        RejectReason::Invalid => ApiError::invalid_token(reason.message()),
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Error returned by the access middleware.
#[derive(Debug, Clone)]
pub struct AccessMiddlewareError(pub ApiError);

impl IntoResponse for AccessMiddlewareError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}
