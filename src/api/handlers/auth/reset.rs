//! Password-reset endpoints: token issuance and reset completion.

use axum::{
    Json, extract::Extension, http::StatusCode, response::IntoResponse,
};
use secrecy::ExposeSecret;
use std::sync::Arc;

use super::state::AuthState;
use super::types::{
    CompleteResetRequest, ErrorResponse, MessageResponse, ResetRequestRequest,
    ResetRequestedResponse, auth_error_response, missing_payload_response,
};

/// The response is identical whether or not the email maps to an account.
const RESET_REQUESTED_MESSAGE: &str = "If the email exists, a reset link will be sent";

/// Request a password reset token for an email address.
///
/// Any prior tokens for the account stop resolving once a new one is issued.
/// Token delivery is out of band; the raw value only appears in the response
/// when the server runs with `--expose-reset-tokens`.
#[utoipa::path(
    post,
    path = "/v1/auth/reset-password-request",
    request_body = ResetRequestRequest,
    responses(
        (status = 200, description = "Accepted; the message does not reveal whether the account exists", body = ResetRequestedResponse),
        (status = 400, description = "Invalid email format", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn request_reset(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetRequestRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload_response();
    };

    match state.service().request_reset(&request.email).await {
        Ok(issued) => {
            let token = if state.config().expose_reset_tokens() {
                issued.map(|issued| issued.token)
            } else {
                None
            };
            (
                StatusCode::OK,
                Json(ResetRequestedResponse {
                    message: RESET_REQUESTED_MESSAGE.to_string(),
                    token,
                }),
            )
                .into_response()
        }
        Err(err) => auth_error_response(&err),
    }
}

/// Complete a password reset: consume the token and install the new
/// credential.
#[utoipa::path(
    post,
    path = "/v1/auth/reset-password",
    request_body = CompleteResetRequest,
    responses(
        (status = 200, description = "Credential replaced and token consumed", body = MessageResponse),
        (status = 400, description = "Weak password or invalid/expired token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn complete_reset(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<CompleteResetRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload_response();
    };

    let token = request.token.trim();
    let new_password = request.new_password.expose_secret();
    if token.is_empty() || new_password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Token and new password required".to_string(),
            }),
        )
            .into_response();
    }

    match state.service().complete_reset(token, new_password).await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Password reset successful".to_string(),
            }),
        )
            .into_response(),
        Err(err) => auth_error_response(&err),
    }
}
