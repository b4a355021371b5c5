//! Store adapters for accounts, sessions, and reset tokens.
//!
//! The authentication service depends only on the traits here; the adapters
//! own all persistence details, including hash-at-rest for token values and
//! the atomicity of uniqueness and sliding-expiry updates.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub use memory::{MemoryAccountStore, MemoryResetTokenStore, MemorySessionStore};
pub use postgres::{PgAccountStore, PgResetTokenStore, PgSessionStore};

/// Adapter-level failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The account email collides with an existing account. Only produced by
    /// [`AccountStore::create`], from a store-level uniqueness constraint.
    #[error("duplicate email")]
    DuplicateEmail,

    /// The backing store failed or timed out.
    #[error("store unavailable")]
    Unavailable(#[from] anyhow::Error),
}

/// Full account record. The credential hash stays inside the store adapters
/// and the authentication service; callers get [`Account`].
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: Uuid,
    pub email: String,
    pub credential_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of an account: no credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            created_at: record.created_at,
        }
    }
}

/// A freshly issued reset token. The raw `token` value exists only in this
/// struct; stores persist its hash.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub token: String,
    pub account_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A resolvable (unexpired) reset token, as seen on lookup.
#[derive(Debug, Clone)]
pub struct ResetTokenRecord {
    pub account_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account. Uniqueness of `email` is enforced atomically by the
    /// store; a losing concurrent create reports [`StoreError::DuplicateEmail`].
    async fn create(&self, email: &str, credential_hash: &str)
    -> Result<AccountRecord, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, StoreError>;

    /// Replace the credential hash and bump `updated_at`. Returns `false`
    /// when no such account exists.
    async fn update_credential(&self, id: Uuid, new_hash: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    /// Issue a fresh token for `account_id`, expiring `ttl` from now.
    async fn create(&self, account_id: Uuid, ttl: Duration)
    -> Result<IssuedResetToken, StoreError>;

    /// Resolve a raw token value. Expired tokens are indistinguishable from
    /// nonexistent ones: both are `None`.
    async fn find_valid(&self, token_value: &str)
    -> Result<Option<ResetTokenRecord>, StoreError>;

    async fn delete(&self, token_value: &str) -> Result<(), StoreError>;

    async fn delete_all_for_account(&self, account_id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session and return its opaque identifier.
    async fn create(&self, account_id: Uuid, ttl: Duration) -> Result<String, StoreError>;

    /// Validate a session identifier. On success the expiry slides forward to
    /// `now + ttl` in the same store operation; `None` covers both expired
    /// and unknown sessions.
    async fn validate(&self, session_id: &str, ttl: Duration)
    -> Result<Option<Uuid>, StoreError>;

    /// Destroy a session. Idempotent: destroying an absent session is fine.
    async fn destroy(&self, session_id: &str) -> Result<(), StoreError>;
}
