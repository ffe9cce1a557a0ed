//! Structured JSON error bodies: `{"error": <message>, "code": <code>}`.

use {
    axum::{
        http::StatusCode,
        response::{IntoResponse, Json, Response},
    },
    tracing::{debug, error},
    vermieter_auth::Error,
};

/// Build a structured error response.
pub fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message, "code": code })),
    )
        .into_response()
}

/// 401 for requests that reached a protected API route without a session.
pub fn unauthenticated() -> Response {
    error_response(
        StatusCode::UNAUTHORIZED,
        "unauthenticated",
        "not authenticated",
    )
}

/// Map an auth error onto status, code, and a client-safe message.
///
/// Server faults are logged here and answered with a generic message.
pub fn auth_error_response(err: &Error) -> Response {
    let (status, code) = match err {
        Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
        Error::Unauthenticated => return unauthenticated(),
        Error::WrongPassword => (StatusCode::FORBIDDEN, "wrong_password"),
        Error::EmailTaken => (StatusCode::CONFLICT, "email_taken"),
        Error::Storage(_) | Error::Migrate(_) | Error::Unexpected { .. } => {
            error!(error = %err, "request failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            );
        },
    };
    debug!(%code, "request rejected");
    error_response(status, code, &err.to_string())
}
