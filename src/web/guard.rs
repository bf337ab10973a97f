// Access-control middleware
//
// Resolves the session cookie to a principal, asks the AccessPolicy about the
// request path and either forwards the request (with the principal attached
// as an extension) or answers with a login redirect / 403.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{found, AppState};
use crate::security::{Decision, SESSION_COOKIE};

/// Extract the session token from the `Cookie` headers, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

pub async fn enforce_access(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = session_token(request.headers()).and_then(|token| state.sessions.get(&token));
    let path = request.uri().path().to_string();

    match state.policy.evaluate(&path, principal.as_ref()) {
        Decision::Allow => {
            if let Some(principal) = principal {
                request.extensions_mut().insert(principal);
            }
            next.run(request).await
        }
        Decision::LoginRequired => {
            debug!(%path, "no session, redirecting to login");
            found("/login")
        }
        Decision::Forbidden => {
            debug!(%path, "principal lacks required role");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}
