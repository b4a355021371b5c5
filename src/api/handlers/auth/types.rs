//! Request/response types for auth endpoints, plus the error-to-response
//! mapping shared by all of them.

use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::auth::{Account, AuthError};

#[derive(ToSchema, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    /// Never logged or echoed; the wrapper redacts `Debug` output.
    #[schema(value_type = String)]
    pub password: SecretString,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    #[schema(value_type = String)]
    pub password: SecretString,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ResetRequestRequest {
    pub email: String,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct CompleteResetRequest {
    pub token: String,
    #[serde(rename = "newPassword")]
    #[schema(value_type = String)]
    pub new_password: SecretString,
}

/// Public account fields. The credential hash never reaches this type.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
    pub user: AccountResponse,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub message: String,
    pub user: AccountResponse,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetRequestedResponse {
    pub message: String,
    /// Only present when the server runs with `--expose-reset-tokens`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub user: AccountResponse,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a service failure onto the HTTP convention: 400 for validation/policy
/// failures, 401 for authentication failures, 500 for infrastructure faults.
/// Infrastructure detail is logged server-side and never echoed.
pub(crate) fn auth_error_response(err: &AuthError) -> Response {
    let status = match err {
        AuthError::InvalidEmail
        | AuthError::WeakPassword
        | AuthError::EmailTaken
        | AuthError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
            error!("auth operation failed: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let message = if err.is_recoverable() {
        err.to_string()
    } else {
        "Internal server error".to_string()
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

pub(crate) fn missing_payload_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Missing payload".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use chrono::Utc;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn register_request_round_trips_and_redacts_debug() -> Result<()> {
        let request: RegisterRequest = serde_json::from_value(json!({
            "email": "alice@example.com",
            "password": "password1",
        }))?;
        assert_eq!(request.email, "alice@example.com");
        assert_eq!(request.password.expose_secret(), "password1");
        assert!(!format!("{request:?}").contains("password1"));
        Ok(())
    }

    #[test]
    fn complete_reset_request_uses_camel_case_field() -> Result<()> {
        let request: CompleteResetRequest = serde_json::from_value(json!({
            "token": "abc",
            "newPassword": "newpass12",
        }))?;
        assert_eq!(request.token, "abc");
        assert_eq!(request.new_password.expose_secret(), "newpass12");
        Ok(())
    }

    #[test]
    fn account_response_from_account() {
        let account = Account {
            id: Uuid::nil(),
            email: "a@b.co".to_string(),
            created_at: Utc::now(),
        };
        let response = AccountResponse::from(account);
        assert_eq!(response.id, Uuid::nil().to_string());
        assert_eq!(response.email, "a@b.co");
        assert!(response.created_at.contains('T'));
    }

    #[test]
    fn reset_requested_response_omits_absent_token() -> Result<()> {
        let response = ResetRequestedResponse {
            message: "If the email exists, a reset link will be sent".to_string(),
            token: None,
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("token").is_none());

        let response = ResetRequestedResponse {
            message: response.message,
            token: Some("raw-token".to_string()),
        };
        let value = serde_json::to_value(&response)?;
        let token = value
            .get("token")
            .and_then(serde_json::Value::as_str)
            .context("missing token")?;
        assert_eq!(token, "raw-token");
        Ok(())
    }

    #[test]
    fn error_mapping_follows_status_convention() {
        let cases = [
            (AuthError::InvalidEmail, StatusCode::BAD_REQUEST),
            (AuthError::WeakPassword, StatusCode::BAD_REQUEST),
            (AuthError::EmailTaken, StatusCode::BAD_REQUEST),
            (AuthError::InvalidOrExpiredToken, StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(auth_error_response(&err).status(), status, "{err}");
        }
        let response =
            auth_error_response(&AuthError::Internal(anyhow::anyhow!("database exploded")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
