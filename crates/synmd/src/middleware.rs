//! Request middleware: body limits and credential checks

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use synm_common::{mask_key, ErrorBody, AUTH_HEADER, COOKIE_NAME};
use tracing::{debug, warn};

use crate::state::SharedStore;

/// Maximum body size: 64 KiB
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Body size limit middleware
///
/// Rejects on an oversized Content-Length up front, then buffers the body
/// with the same cap so requests without a length (chunked) are held to it
/// too.
pub async fn body_size_limit(request: Request, next: Next) -> Result<Response, StatusCode> {
    if let Some(length) = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
    {
        if length > MAX_BODY_SIZE {
            warn!(
                "Request body too large: {} bytes (max: {})",
                length, MAX_BODY_SIZE
            );
            return Err(StatusCode::PAYLOAD_TOO_LARGE);
        }
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(
                "Request body rejected while reading (max: {}): {}",
                MAX_BODY_SIZE, e
            );
            return Err(StatusCode::PAYLOAD_TOO_LARGE);
        }
    };

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Credential middleware for everything outside `/api/auth`
///
/// Open until the store is initialized; afterwards the `X-Auth-Key` header
/// or the `synm_key` cookie must carry the established key.
pub async fn require_auth(State(store): State<SharedStore>, request: Request, next: Next) -> Response {
    let presented = extract_auth_key(request.headers());
    let allowed = store.read().await.auth.verify(presented.as_deref());

    if !allowed {
        warn!(
            "Rejected {} {} (key: {})",
            request.method(),
            request.uri().path(),
            presented.as_deref().map(mask_key).unwrap_or_else(|| "none".to_string())
        );
        return (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("unauthorized"))).into_response();
    }

    debug!("Authorized {} {}", request.method(), request.uri().path());
    next.run(request).await
}

/// Credential from the `X-Auth-Key` header, falling back to the cookie
pub fn extract_auth_key(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(key.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}
