//! In-memory store adapters.
//!
//! Mutex-guarded maps with the same hash-at-rest keys and lazy expiry as the
//! PostgreSQL adapters. Suitable as a cache-style session backing and as the
//! deterministic backing for tests; nothing survives a restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    AccountRecord, AccountStore, IssuedResetToken, ResetTokenRecord, ResetTokenStore, SessionStore,
    StoreError,
};
use crate::auth::token::{generate_token, hash_token};

fn expiry(ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .map(|ttl| Utc::now() + ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Default)]
pub struct MemoryAccountStore {
    // Email uniqueness holds because create runs under this single lock.
    accounts: Mutex<HashMap<Uuid, AccountRecord>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(
        &self,
        email: &str,
        credential_hash: &str,
    ) -> Result<AccountRecord, StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.values().any(|record| record.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = Utc::now();
        let record = AccountRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            credential_hash: credential_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        accounts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|record| record.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn update_credential(&self, id: Uuid, new_hash: &str) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().await;
        match accounts.get_mut(&id) {
            Some(record) => {
                record.credential_hash = new_hash.to_string();
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

struct ResetTokenEntry {
    account_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryResetTokenStore {
    // Keyed by token hash; raw token values are never held.
    tokens: Mutex<HashMap<Vec<u8>, ResetTokenEntry>>,
}

impl MemoryResetTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of token records currently held, expired ones included.
    /// Expiry is a query-time filter, so stale records linger until
    /// overwritten; tests assert on that.
    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.lock().await.is_empty()
    }
}

#[async_trait]
impl ResetTokenStore for MemoryResetTokenStore {
    async fn create(
        &self,
        account_id: Uuid,
        ttl: Duration,
    ) -> Result<IssuedResetToken, StoreError> {
        let token = generate_token()?;
        let expires_at = expiry(ttl);
        let mut tokens = self.tokens.lock().await;
        tokens.insert(
            hash_token(&token),
            ResetTokenEntry {
                account_id,
                expires_at,
            },
        );
        Ok(IssuedResetToken {
            token,
            account_id,
            expires_at,
        })
    }

    async fn find_valid(
        &self,
        token_value: &str,
    ) -> Result<Option<ResetTokenRecord>, StoreError> {
        let tokens = self.tokens.lock().await;
        Ok(tokens
            .get(&hash_token(token_value))
            .filter(|entry| entry.expires_at > Utc::now())
            .map(|entry| ResetTokenRecord {
                account_id: entry.account_id,
                expires_at: entry.expires_at,
            }))
    }

    async fn delete(&self, token_value: &str) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().await;
        tokens.remove(&hash_token(token_value));
        Ok(())
    }

    async fn delete_all_for_account(&self, account_id: Uuid) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().await;
        tokens.retain(|_, entry| entry.account_id != account_id);
        Ok(())
    }
}

struct SessionEntry {
    account_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<Vec<u8>, SessionEntry>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, account_id: Uuid, ttl: Duration) -> Result<String, StoreError> {
        let token = generate_token()?;
        let mut sessions = self.sessions.lock().await;
        // Opportunistic sweep keeps the map from accumulating dead sessions.
        sessions.retain(|_, entry| entry.expires_at > Utc::now());
        sessions.insert(
            hash_token(&token),
            SessionEntry {
                account_id,
                expires_at: expiry(ttl),
            },
        );
        Ok(token)
    }

    async fn validate(
        &self,
        session_id: &str,
        ttl: Duration,
    ) -> Result<Option<Uuid>, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let key = hash_token(session_id);
        match sessions.get_mut(&key) {
            Some(entry) if entry.expires_at > Utc::now() => {
                // Slide the idle window under the same lock that read it.
                entry.expires_at = expiry(ttl);
                Ok(Some(entry.account_id))
            }
            Some(_) => {
                sessions.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn destroy(&self, session_id: &str) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(&hash_token(session_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn account_create_enforces_unique_email() -> Result<()> {
        let store = MemoryAccountStore::new();
        store.create("a@b.co", "hash-1").await?;
        let err = store.create("a@b.co", "hash-2").await;
        assert!(matches!(err, Err(StoreError::DuplicateEmail)));

        let found = store.find_by_email("a@b.co").await?;
        assert_eq!(found.map(|record| record.credential_hash).as_deref(), Some("hash-1"));
        Ok(())
    }

    #[tokio::test]
    async fn account_update_credential_bumps_updated_at() -> Result<()> {
        let store = MemoryAccountStore::new();
        let record = store.create("a@b.co", "hash-1").await?;
        assert!(store.update_credential(record.id, "hash-2").await?);

        let updated = store.find_by_id(record.id).await?.map(|record| {
            (record.credential_hash, record.updated_at >= record.created_at)
        });
        assert_eq!(updated, Some(("hash-2".to_string(), true)));

        assert!(!store.update_credential(Uuid::new_v4(), "hash-3").await?);
        Ok(())
    }

    #[tokio::test]
    async fn reset_token_expiry_is_a_query_time_filter() -> Result<()> {
        let store = MemoryResetTokenStore::new();
        let account_id = Uuid::new_v4();
        let issued = store.create(account_id, Duration::ZERO).await?;

        // The record is still in storage, but unresolvable.
        assert_eq!(store.len().await, 1);
        assert!(store.find_valid(&issued.token).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn reset_token_delete_all_clears_only_one_account() -> Result<()> {
        let store = MemoryResetTokenStore::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let first_token = store.create(first, Duration::from_secs(3600)).await?;
        let second_token = store.create(second, Duration::from_secs(3600)).await?;

        store.delete_all_for_account(first).await?;
        assert!(store.find_valid(&first_token.token).await?.is_none());
        assert!(store.find_valid(&second_token.token).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn session_validate_slides_expiry() -> Result<()> {
        let store = MemorySessionStore::new();
        let account_id = Uuid::new_v4();
        let session_id = store.create(account_id, Duration::from_secs(3600)).await?;

        let validated = store
            .validate(&session_id, Duration::from_secs(3600))
            .await?;
        assert_eq!(validated, Some(account_id));

        // A sliding window of zero expires the session on the next access.
        store.validate(&session_id, Duration::ZERO).await?;
        let validated = store
            .validate(&session_id, Duration::from_secs(3600))
            .await?;
        assert_eq!(validated, None);
        Ok(())
    }

    #[tokio::test]
    async fn session_destroy_is_idempotent() -> Result<()> {
        let store = MemorySessionStore::new();
        let session_id = store
            .create(Uuid::new_v4(), Duration::from_secs(3600))
            .await?;
        store.destroy(&session_id).await?;
        store.destroy(&session_id).await?;
        store.destroy("never-existed").await?;
        assert!(
            store
                .validate(&session_id, Duration::from_secs(3600))
                .await?
                .is_none()
        );
        Ok(())
    }
}
