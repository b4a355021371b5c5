//! PostgreSQL store adapters.
//!
//! Plain runtime queries wrapped in `db.query` spans, TTL arithmetic in SQL
//! so the database clock is authoritative, and token hashes as the only
//! stored representation of token values.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use super::{
    AccountRecord, AccountStore, IssuedResetToken, ResetTokenRecord, ResetTokenStore, StoreError,
    SessionStore,
};
use crate::auth::token::{generate_token, hash_token};

/// Attempts before giving up on generating a non-colliding token hash.
const TOKEN_INSERT_ATTEMPTS: usize = 3;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn ttl_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &sqlx::postgres::PgRow) -> AccountRecord {
    AccountRecord {
        id: row.get("id"),
        email: row.get("email"),
        credential_hash: row.get("credential_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(
        &self,
        email: &str,
        credential_hash: &str,
    ) -> Result<AccountRecord, StoreError> {
        // The UNIQUE constraint on email is the arbiter for concurrent
        // creates; the service's pre-check is only a fast path.
        let query = r"
            INSERT INTO accounts (id, email, credential_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, credential_hash, created_at, updated_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(credential_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(account_from_row(&row)),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateEmail),
            Err(err) => Err(StoreError::Unavailable(
                anyhow!(err).context("failed to insert account"),
            )),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let query = r"
            SELECT id, email, credential_hash, created_at, updated_at
            FROM accounts
            WHERE email = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup account by email")?;
        Ok(row.map(|row| account_from_row(&row)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, StoreError> {
        let query = r"
            SELECT id, email, credential_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup account by id")?;
        Ok(row.map(|row| account_from_row(&row)))
    }

    async fn update_credential(&self, id: Uuid, new_hash: &str) -> Result<bool, StoreError> {
        let query = r"
            UPDATE accounts
            SET credential_hash = $2,
                updated_at = NOW()
            WHERE id = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(id)
            .bind(new_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update credential")?;
        Ok(result.rows_affected() == 1)
    }
}

#[derive(Clone)]
pub struct PgResetTokenStore {
    pool: PgPool,
}

impl PgResetTokenStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetTokenStore for PgResetTokenStore {
    async fn create(
        &self,
        account_id: Uuid,
        ttl: Duration,
    ) -> Result<IssuedResetToken, StoreError> {
        let query = r"
            INSERT INTO reset_tokens (id, account_id, token_hash, expires_at)
            VALUES ($1, $2, $3, NOW() + ($4 * INTERVAL '1 second'))
            RETURNING expires_at
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        for _ in 0..TOKEN_INSERT_ATTEMPTS {
            let token = generate_token()?;
            let token_hash = hash_token(&token);
            let result = sqlx::query(query)
                .bind(Uuid::new_v4())
                .bind(account_id)
                .bind(&token_hash)
                .bind(ttl_seconds(ttl))
                .fetch_one(&self.pool)
                .instrument(span.clone())
                .await;

            match result {
                Ok(row) => {
                    let expires_at: DateTime<Utc> = row.get("expires_at");
                    return Ok(IssuedResetToken {
                        token,
                        account_id,
                        expires_at,
                    });
                }
                Err(err) if is_unique_violation(&err) => {}
                Err(err) => {
                    return Err(StoreError::Unavailable(
                        anyhow!(err).context("failed to insert reset token"),
                    ));
                }
            }
        }

        Err(StoreError::Unavailable(anyhow!(
            "failed to generate unique reset token"
        )))
    }

    async fn find_valid(
        &self,
        token_value: &str,
    ) -> Result<Option<ResetTokenRecord>, StoreError> {
        // Expiry is filtered here: an expired row may still exist but is
        // indistinguishable from a missing one to the caller.
        let query = r"
            SELECT account_id, expires_at
            FROM reset_tokens
            WHERE token_hash = $1
              AND expires_at > NOW()
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(hash_token(token_value))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup reset token")?;
        Ok(row.map(|row| ResetTokenRecord {
            account_id: row.get("account_id"),
            expires_at: row.get("expires_at"),
        }))
    }

    async fn delete(&self, token_value: &str) -> Result<(), StoreError> {
        let query = "DELETE FROM reset_tokens WHERE token_hash = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(hash_token(token_value))
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete reset token")?;
        Ok(())
    }

    async fn delete_all_for_account(&self, account_id: Uuid) -> Result<(), StoreError> {
        let query = "DELETE FROM reset_tokens WHERE account_id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(account_id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete reset tokens for account")?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, account_id: Uuid, ttl: Duration) -> Result<String, StoreError> {
        let query = r"
            INSERT INTO sessions (session_hash, account_id, expires_at)
            VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        for _ in 0..TOKEN_INSERT_ATTEMPTS {
            let token = generate_token()?;
            let token_hash = hash_token(&token);
            let result = sqlx::query(query)
                .bind(&token_hash)
                .bind(account_id)
                .bind(ttl_seconds(ttl))
                .execute(&self.pool)
                .instrument(span.clone())
                .await;

            match result {
                Ok(_) => return Ok(token),
                Err(err) if is_unique_violation(&err) => {}
                Err(err) => {
                    return Err(StoreError::Unavailable(
                        anyhow!(err).context("failed to insert session"),
                    ));
                }
            }
        }

        Err(StoreError::Unavailable(anyhow!(
            "failed to generate unique session identifier"
        )))
    }

    async fn validate(
        &self,
        session_id: &str,
        ttl: Duration,
    ) -> Result<Option<Uuid>, StoreError> {
        // Read-then-extend as one statement: concurrent validations of the
        // same session cannot lose an extension, and expired rows are
        // filtered rather than swept.
        let query = r"
            UPDATE sessions
            SET expires_at = NOW() + ($2 * INTERVAL '1 second')
            WHERE session_hash = $1
              AND expires_at > NOW()
            RETURNING account_id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(hash_token(session_id))
            .bind(ttl_seconds(ttl))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to validate session")?;
        Ok(row.map(|row| row.get("account_id")))
    }

    async fn destroy(&self, session_id: &str) -> Result<(), StoreError> {
        // Logout is idempotent; it's fine if no rows are deleted.
        let query = "DELETE FROM sessions WHERE session_hash = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(hash_token(session_id))
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete session")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn ttl_seconds_saturates() {
        assert_eq!(ttl_seconds(Duration::from_secs(3600)), 3600);
        assert_eq!(ttl_seconds(Duration::from_secs(u64::MAX)), i64::MAX);
    }
}
