//! The authentication service: orchestration of registration, login,
//! sessions, and password-reset lifecycle over injected store adapters.

use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::error::AuthError;
use super::store::{
    Account, AccountStore, IssuedResetToken, ResetTokenStore, SessionStore,
};
use super::validation::{is_valid_email, is_valid_password, normalize_email};
use super::{events, password};

/// Default sliding idle window for sessions: 24 hours.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default reset token lifetime: 1 hour, fixed at issuance.
pub const DEFAULT_RESET_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Request-scoped orchestration core. Holds no mutable state of its own;
/// all shared state lives behind the injected store adapters.
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
    reset_token_ttl: Duration,
}

impl AuthService {
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            accounts,
            reset_tokens,
            sessions,
            session_ttl: DEFAULT_SESSION_TTL,
            reset_token_ttl: DEFAULT_RESET_TOKEN_TTL,
        }
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_reset_token_ttl(mut self, ttl: Duration) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    /// Register a new account.
    ///
    /// The pre-check against `find_by_email` is a fast path; the store's
    /// uniqueness constraint is what decides concurrent registrations, and a
    /// losing insert surfaces as [`AuthError::EmailTaken`] too.
    ///
    /// # Errors
    /// `InvalidEmail`, `WeakPassword`, `EmailTaken`, or a store failure.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if !is_valid_password(password) {
            return Err(AuthError::WeakPassword);
        }
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let credential_hash = hash_blocking(password).await?;
        let record = self.accounts.create(&email, &credential_hash).await?;

        events::account_registered(record.id, &record.email);
        Ok(record.into())
    }

    /// Authenticate and open a session.
    ///
    /// Absent account and wrong password are deliberately indistinguishable:
    /// both fail with [`AuthError::InvalidCredentials`].
    ///
    /// # Errors
    /// `InvalidCredentials` or a store failure.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, Account), AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(record) = self.accounts.find_by_email(&email).await? else {
            events::login_failed(&email);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_blocking(password, &record.credential_hash).await? {
            events::login_failed(&email);
            return Err(AuthError::InvalidCredentials);
        }

        let session_id = self.sessions.create(record.id, self.session_ttl).await?;
        events::login_succeeded(record.id);
        Ok((session_id, record.into()))
    }

    /// Destroy a session. Idempotent: an absent or already-expired session is
    /// not an error.
    ///
    /// # Errors
    /// Store failure only.
    pub async fn logout(&self, session_id: &str) -> Result<(), AuthError> {
        self.sessions.destroy(session_id).await?;
        events::logout();
        Ok(())
    }

    /// Request a password reset.
    ///
    /// Returns `Ok(None)` for unknown emails so the transport can answer with
    /// the same generic message either way. For known accounts, all prior
    /// tokens are deleted before the new one is issued, so at most one token
    /// resolves at any instant.
    ///
    /// # Errors
    /// `InvalidEmail` or a store failure.
    pub async fn request_reset(
        &self,
        email: &str,
    ) -> Result<Option<IssuedResetToken>, AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let Some(record) = self.accounts.find_by_email(&email).await? else {
            events::reset_requested(None);
            return Ok(None);
        };

        self.reset_tokens.delete_all_for_account(record.id).await?;
        let issued = self
            .reset_tokens
            .create(record.id, self.reset_token_ttl)
            .await?;

        events::reset_requested(Some(record.id));
        Ok(Some(issued))
    }

    /// Complete a password reset with a previously issued token.
    ///
    /// The token is consumed only after the credential update succeeds, so a
    /// failed update leaves it usable for a retry. A failed deletion after a
    /// successful update is cleanup residue, not a failure: the stale record
    /// stays expiry-filtered and becomes inert.
    ///
    /// # Errors
    /// `WeakPassword`, `InvalidOrExpiredToken`, or a store failure.
    pub async fn complete_reset(
        &self,
        token_value: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if !is_valid_password(new_password) {
            return Err(AuthError::WeakPassword);
        }

        let Some(token) = self.reset_tokens.find_valid(token_value).await? else {
            return Err(AuthError::InvalidOrExpiredToken);
        };

        let credential_hash = hash_blocking(new_password).await?;
        if !self
            .accounts
            .update_credential(token.account_id, &credential_hash)
            .await?
        {
            // The account vanished between issuance and completion; the token
            // resolves nothing and is reported like any dead token.
            return Err(AuthError::InvalidOrExpiredToken);
        }

        if let Err(err) = self.reset_tokens.delete(token_value).await {
            warn!("failed to delete consumed reset token: {err}");
        }

        events::reset_completed(token.account_id);
        Ok(())
    }

    /// Resolve a session identifier to its account, sliding the idle window.
    ///
    /// # Errors
    /// `Unauthorized` for expired/unknown sessions (and for sessions whose
    /// account no longer exists), or a store failure.
    pub async fn current_account(&self, session_id: &str) -> Result<Account, AuthError> {
        let Some(account_id) = self
            .sessions
            .validate(session_id, self.session_ttl)
            .await?
        else {
            return Err(AuthError::Unauthorized);
        };

        let Some(record) = self.accounts.find_by_id(account_id).await? else {
            return Err(AuthError::Unauthorized);
        };

        Ok(record.into())
    }
}

/// Offload Argon2 hashing to the blocking pool; it is CPU-bound and would
/// otherwise stall concurrent request handling.
async fn hash_blocking(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || password::hash(&password))
        .await
        .map_err(|err| AuthError::Internal(anyhow!("hashing task failed: {err}")))?
        .map_err(AuthError::Internal)
}

async fn verify_blocking(password: &str, credential_hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let credential_hash = credential_hash.to_string();
    tokio::task::spawn_blocking(move || password::verify(&password, &credential_hash))
        .await
        .map_err(|err| AuthError::Internal(anyhow!("verification task failed: {err}")))
}
