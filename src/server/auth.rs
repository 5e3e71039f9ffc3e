//! Basic-Auth Gate
//!
//! A single credential pair guards the device-facing routes. The check runs
//! as middleware, so on failure no handler is ever reached.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;

use crate::server::api::ApiState;

pub async fn require_basic_auth(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = format!("{}:{}", state.auth.username, state.auth.password);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| {
            base64::engine::general_purpose::STANDARD.decode(encoded).ok()
        })
        .map(|decoded| decoded == expected.as_bytes())
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        tracing::warn!("rejected unauthenticated request");
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"otaserve\"")],
            "Unauthorized",
        )
            .into_response()
    }
}

/// Encode a credential pair as an `Authorization` header value.
///
/// Used by tests and handy for curl-less clients.
pub fn basic_header(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}
