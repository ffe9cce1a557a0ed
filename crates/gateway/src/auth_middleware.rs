use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderMap, Request, header::COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use {tracing::debug, vermieter_auth::Identity};

use crate::{api_error, state::AppState};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session-token";

/// The authenticated caller, placed in request extensions by
/// [`require_auth`] or [`require_page_auth`].
///
/// Handlers behind either middleware take this as an argument; on an
/// unprotected route extraction fails with 401.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or_else(api_error::unauthenticated)
    }
}

/// Middleware for API routes: 401 JSON unless the session cookie resolves.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match resolve(&state, request.headers()).await {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        },
        None => {
            debug!(path = %request.uri().path(), "rejected unauthenticated api request");
            api_error::unauthenticated()
        },
    }
}

/// Middleware for page routes: redirect to the login page unless the
/// session cookie resolves.
pub async fn require_page_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match resolve(&state, request.headers()).await {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        },
        None => Redirect::to(&state.login_path).into_response(),
    }
}

async fn resolve(state: &AppState, headers: &HeaderMap) -> Option<Identity> {
    let token = session_token(headers)?;
    state.sessions().resolve_identity(token).await
}

/// The session token from the request's `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|header| parse_cookie(header, SESSION_COOKIE))
        .filter(|token| !token.is_empty())
}

/// Parse a specific cookie value from a Cookie header string.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(name)
            && let Some(value) = value.strip_prefix('=')
        {
            return Some(value);
        }
    }
    None
}
