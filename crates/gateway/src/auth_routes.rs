use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use {
    secrecy::SecretString,
    serde::Deserialize,
    tracing::debug,
    vermieter_auth::{Error, SESSION_TTL_SECS, SignedIn},
};

use crate::{
    api_error::{auth_error_response, error_response},
    auth_middleware::{CurrentIdentity, SESSION_COOKIE, require_auth, session_token},
    state::{AppState, CookiePolicy},
};

/// Build the auth router: public `/login`, `/logout`, `/register` and the
/// session-gated `/identity`, `/me`, `/password`.
pub fn auth_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/identity", get(identity_handler))
        .route("/me", get(identity_handler))
        .route("/password", post(change_password_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/register", post(register_handler))
        .merge(protected)
}

// ── Login ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<SecretString>,
}

async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return malformed_body(&rejection),
    };
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return auth_error_response(&Error::validation("email and password are required"));
    };

    match state.auth.login(email.trim(), &password).await {
        Ok(signed_in) => session_response(
            StatusCode::OK,
            "login successful",
            signed_in,
            state.cookies,
        ),
        Err(e) => auth_error_response(&e),
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers)
        && let Err(e) = state.sessions().destroy_session(token).await
    {
        return auth_error_response(&e);
    }
    clear_session_response(state.cookies)
}

// ── Registration ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    password: Option<SecretString>,
}

async fn register_handler(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return malformed_body(&rejection),
    };
    let (Some(email), Some(name), Some(password)) = (body.email, body.name, body.password) else {
        return auth_error_response(&Error::validation(
            "email, name and password are required",
        ));
    };

    match state.auth.register(email.trim(), &name, &password).await {
        Ok(signed_in) => session_response(
            StatusCode::CREATED,
            "registration successful",
            signed_in,
            state.cookies,
        ),
        Err(e) => auth_error_response(&e),
    }
}

// ── Identity (requires session) ──────────────────────────────────────────────

async fn identity_handler(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
    Json(identity)
}

// ── Password change (requires session) ───────────────────────────────────────

#[derive(Deserialize)]
struct ChangePasswordRequest {
    #[serde(default)]
    current_password: Option<SecretString>,
    #[serde(default)]
    new_password: Option<SecretString>,
}

async fn change_password_handler(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return malformed_body(&rejection),
    };
    let (Some(current), Some(new_password)) = (body.current_password, body.new_password) else {
        return auth_error_response(&Error::validation(
            "current_password and new_password are required",
        ));
    };

    match state
        .auth
        .change_password(&identity, &current, &new_password)
        .await
    {
        Ok(()) => Json(serde_json::json!({ "message": "password changed" })).into_response(),
        Err(e) => auth_error_response(&e),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn malformed_body(rejection: &JsonRejection) -> Response {
    debug!(error = %rejection.body_text(), "malformed request body");
    error_response(
        StatusCode::BAD_REQUEST,
        "validation_error",
        "request body must be a JSON object",
    )
}

/// `Set-Cookie` value carrying a fresh session token.
pub fn session_cookie(token: &str, policy: CookiePolicy) -> String {
    let secure = if policy.secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={SESSION_TTL_SECS}{secure}")
}

/// `Set-Cookie` value that expires the session cookie immediately.
pub fn clear_session_cookie(policy: CookiePolicy) -> String {
    let secure = if policy.secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0{secure}")
}

fn session_response(
    status: StatusCode,
    message: &str,
    signed_in: SignedIn,
    policy: CookiePolicy,
) -> Response {
    let cookie = session_cookie(&signed_in.token, policy);
    (
        status,
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({ "message": message, "user": signed_in.identity })),
    )
        .into_response()
}

fn clear_session_response(policy: CookiePolicy) -> Response {
    (
        StatusCode::OK,
        [(SET_COOKIE, clear_session_cookie(policy))],
        Json(serde_json::json!({ "message": "logout successful" })),
    )
        .into_response()
}
