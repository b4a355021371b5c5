//! Login endpoint: credential verification plus session issuance.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::error;

use super::session::session_cookie;
use super::state::AuthState;
use super::types::{
    ErrorResponse, LoginRequest, LoginResponse, auth_error_response, missing_payload_response,
};

/// Authenticate with email and password; on success the opaque session
/// identifier is delivered as an `HttpOnly` cookie.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload_response();
    };

    let email = request.email.trim();
    let password = request.password.expose_secret();
    if email.is_empty() || password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Email and password required".to_string(),
            }),
        )
            .into_response();
    }

    match state.service().login(email, password).await {
        Ok((session_id, account)) => {
            let mut headers = HeaderMap::new();
            match session_cookie(state.config(), &session_id) {
                Ok(cookie) => {
                    headers.insert(SET_COOKIE, cookie);
                }
                Err(err) => {
                    // A session id that cannot be carried in a header is
                    // useless to the caller; fail loudly.
                    error!("Failed to build session cookie: {err}");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: "Internal server error".to_string(),
                        }),
                    )
                        .into_response();
                }
            }
            (
                StatusCode::OK,
                headers,
                Json(LoginResponse {
                    message: "Login successful".to_string(),
                    user: account.into(),
                }),
            )
                .into_response()
        }
        Err(err) => auth_error_response(&err),
    }
}
