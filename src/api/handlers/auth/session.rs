//! Session cookie handling, the current-account endpoint, and logout.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use super::state::{AuthConfig, AuthState};
use super::types::{MeResponse, MessageResponse, auth_error_response};
use crate::auth::AuthError;

const SESSION_COOKIE_NAME: &str = "custos_session";

/// Return the account bound to the presented session, sliding its idle
/// window forward.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = MeResponse),
        (status = 401, description = "Missing, invalid, or expired session", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Missing cookies fail exactly like expired ones to avoid leaking state.
    let Some(session_id) = extract_session_token(&headers) else {
        return auth_error_response(&AuthError::Unauthorized);
    };

    match state.service().current_account(&session_id).await {
        Ok(account) => (
            StatusCode::OK,
            Json(MeResponse {
                user: account.into(),
            }),
        )
            .into_response(),
        Err(err) => auth_error_response(&err),
    }
}

/// Destroy the presented session. Idempotent: callers without a session, or
/// with a dead one, still get a success and a cleared cookie.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 200, description = "Session destroyed", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    if let Some(session_id) = extract_session_token(&headers) {
        if let Err(err) = state.service().logout(&session_id).await {
            error!("Failed to destroy session: {err:?}");
        }
    }

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(state.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (
        StatusCode::OK,
        response_headers,
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    )
        .into_response()
}

/// Build the `HttpOnly` session cookie for a freshly created session.
pub(super) fn session_cookie(
    config: &AuthConfig,
    session_id: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={session_id}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_session_cookie(
    config: &AuthConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Pull the session identifier from the request: bearer header first for
/// non-browser callers, session cookie otherwise.
pub(super) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_flags() {
        let config = AuthConfig::new("https://app.custos.dev".to_string());
        let cookie = session_cookie(&config, "session-id").ok();
        let cookie = cookie.and_then(|value| value.to_str().map(str::to_string).ok());
        let Some(cookie) = cookie else {
            panic!("cookie should build");
        };
        assert!(cookie.starts_with("custos_session=session-id; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn session_cookie_not_secure_over_http() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        let cookie = session_cookie(&config, "session-id").ok();
        let cookie = cookie.and_then(|value| value.to_str().map(str::to_string).ok());
        assert!(cookie.is_some_and(|cookie| !cookie.contains("Secure")));
    }

    #[test]
    fn clear_session_cookie_expires_immediately() {
        let config = AuthConfig::new("http://localhost:3000".to_string());
        let cookie = clear_session_cookie(&config).ok();
        let cookie = cookie.and_then(|value| value.to_str().map(str::to_string).ok());
        assert!(cookie.is_some_and(|cookie| cookie.contains("Max-Age=0")));
    }

    #[test]
    fn extract_session_token_reads_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("other=1; custos_session=abc; theme=dark"),
        );
        assert_eq!(extract_session_token(&headers), Some("abc".to_string()));
    }

    #[test]
    fn extract_session_token_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-1"));
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("custos_session=tok-2"),
        );
        assert_eq!(extract_session_token(&headers), Some("tok-1".to_string()));
    }

    #[test]
    fn extract_session_token_none_when_absent() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_session_token(&headers), None);
    }
}
