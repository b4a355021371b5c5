//! Account registration endpoint.

use axum::{
    Json, extract::Extension, http::StatusCode, response::IntoResponse,
};
use secrecy::ExposeSecret;
use std::sync::Arc;

use super::state::AuthState;
use super::types::{
    RegisterRequest, RegisterResponse, auth_error_response, missing_payload_response,
};

/// Create an account from an email and password.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid email, weak password, or duplicate email", body = super::types::ErrorResponse),
        (status = 500, description = "Store failure", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload_response();
    };

    match state
        .service()
        .register(&request.email, request.password.expose_secret())
        .await
    {
        Ok(account) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                message: "Registration successful".to_string(),
                user: account.into(),
            }),
        )
            .into_response(),
        Err(err) => auth_error_response(&err),
    }
}
