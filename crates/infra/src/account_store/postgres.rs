//! Postgres-backed account store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | AccountStoreError |
//! |------------|----------------------|-------------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any other | `Backend` |
//! | PoolTimedOut / PoolClosed / Io | N/A | `Unavailable` |
//! | Other | N/A | `Backend` |
//!
//! The `UNIQUE` constraint on `external_subject_id` is what settles two
//! concurrent sign-ups for the same identity.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use fedgate_auth::{Account, AccountStore, AccountStoreError, NewAccount};
use fedgate_core::AccountId;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id                  UUID PRIMARY KEY,
    external_subject_id TEXT NOT NULL UNIQUE,
    email               TEXT NOT NULL,
    given_name          TEXT NOT NULL,
    family_name         TEXT NOT NULL,
    access_token        TEXT NOT NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Account store over a shared SQLx connection pool.
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the `accounts` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, AccountStoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), AccountStoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self))]
    async fn find_by_external_id(
        &self,
        external_subject_id: &str,
    ) -> Result<Option<Account>, AccountStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, external_subject_id, email, given_name, family_name, access_token
            FROM accounts
            WHERE external_subject_id = $1
            "#,
        )
        .bind(external_subject_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_external_id", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, external_subject_id, email, given_name, family_name, access_token
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<u64, AccountStoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM accounts")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count", e))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self, account), fields(external_subject_id = %account.external_subject_id))]
    async fn create(&self, account: NewAccount) -> Result<Account, AccountStoreError> {
        let id = AccountId::new();
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (id, external_subject_id, email, given_name, family_name, access_token)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&account.external_subject_id)
        .bind(&account.email)
        .bind(&account.given_name)
        .bind(&account.family_name)
        .bind(&account.access_token)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(account.into_account(id)),
            Err(e) if is_unique_violation(&e) => {
                Err(AccountStoreError::Conflict(account.external_subject_id))
            }
            Err(e) => Err(map_sqlx_error("create", e)),
        }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, AccountStoreError> {
    let get = |e: sqlx::Error| map_sqlx_error("decode_account", e);
    let id: Uuid = row.try_get("id").map_err(get)?;
    Ok(Account {
        id: AccountId::from_uuid(id),
        external_subject_id: row.try_get("external_subject_id").map_err(get)?,
        email: row.try_get("email").map_err(get)?,
        given_name: row.try_get("given_name").map_err(get)?,
        family_name: row.try_get("family_name").map_err(get)?,
        access_token: row.try_get("access_token").map_err(get)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> AccountStoreError {
    match err {
        sqlx::Error::Database(db_err) => AccountStoreError::Backend(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            AccountStoreError::Unavailable(format!("connection pool unavailable in {}", operation))
        }
        sqlx::Error::Io(e) => {
            AccountStoreError::Unavailable(format!("io error in {}: {}", operation, e))
        }
        other => AccountStoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}
