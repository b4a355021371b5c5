//! Error taxonomy for the authentication core.

use thiserror::Error;

/// Failures surfaced by the [`AuthService`](crate::auth::AuthService)
/// operations.
///
/// The recoverable variants carry caller-facing messages; credential material
/// never appears in any of them. `InvalidCredentials` is deliberately shared
/// between "no such account" and "wrong password" so responses cannot be used
/// to enumerate accounts.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least 8 characters")]
    WeakPassword,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Unauthorized")]
    Unauthorized,

    /// The backing store failed or timed out. Not retried by the core.
    #[error("Store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),

    /// Unexpected failure (blocked task, invariant violation).
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    /// Whether the failure is recoverable by the caller correcting its input
    /// or re-authenticating, as opposed to an infrastructure fault.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::StoreUnavailable(_) | Self::Internal(_))
    }
}

impl From<super::store::StoreError> for AuthError {
    fn from(err: super::store::StoreError) -> Self {
        match err {
            super::store::StoreError::DuplicateEmail => Self::EmailTaken,
            super::store::StoreError::Unavailable(source) => Self::StoreUnavailable(source),
        }
    }
}
