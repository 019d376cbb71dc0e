use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use fedgate_core::AccountId;

use crate::identity::{Account, NewAccount};

/// Account datastore failure.
///
/// These are infrastructure errors; the orchestrator resolves every one of
/// them into a [`crate::SessionError`] before returning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountStoreError {
    /// The datastore could not be reached.
    #[error("account store unavailable: {0}")]
    Unavailable(String),

    /// An account already exists for this external subject id.
    #[error("account already exists for external subject '{0}'")]
    Conflict(String),

    /// Any other storage failure.
    #[error("account store failure: {0}")]
    Backend(String),
}

/// Account datastore contract.
///
/// Implementations MUST enforce uniqueness of `external_subject_id` and
/// report a duplicate `create` as [`AccountStoreError::Conflict`] instead of
/// overwriting. Concurrent sign-ups for the same identity rely on this: both
/// may pass the lookup, and only the datastore decides which create wins.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_external_id(
        &self,
        external_subject_id: &str,
    ) -> Result<Option<Account>, AccountStoreError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountStoreError>;

    async fn count(&self) -> Result<u64, AccountStoreError>;

    async fn create(&self, account: NewAccount) -> Result<Account, AccountStoreError>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn find_by_external_id(
        &self,
        external_subject_id: &str,
    ) -> Result<Option<Account>, AccountStoreError> {
        (**self).find_by_external_id(external_subject_id).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountStoreError> {
        (**self).find_by_id(id).await
    }

    async fn count(&self) -> Result<u64, AccountStoreError> {
        (**self).count().await
    }

    async fn create(&self, account: NewAccount) -> Result<Account, AccountStoreError> {
        (**self).create(account).await
    }
}
