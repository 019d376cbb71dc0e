use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use fedgate_auth::{Account, AccountStore, AccountStoreError, NewAccount};
use fedgate_core::AccountId;

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<AccountId, Account>,
    /// Unique index: external subject id -> account id.
    by_subject: HashMap<String, AccountId>,
}

/// In-memory account store.
///
/// Intended for tests/dev. The subject index is checked and updated under a
/// single write lock, so a duplicate `create` always loses with `Conflict`.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<Accounts>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> AccountStoreError {
    AccountStoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_external_id(
        &self,
        external_subject_id: &str,
    ) -> Result<Option<Account>, AccountStoreError> {
        let accounts = self.inner.read().map_err(|_| poisoned())?;
        Ok(accounts
            .by_subject
            .get(external_subject_id)
            .and_then(|id| accounts.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountStoreError> {
        let accounts = self.inner.read().map_err(|_| poisoned())?;
        Ok(accounts.by_id.get(&id).cloned())
    }

    async fn count(&self) -> Result<u64, AccountStoreError> {
        let accounts = self.inner.read().map_err(|_| poisoned())?;
        Ok(accounts.by_id.len() as u64)
    }

    async fn create(&self, account: NewAccount) -> Result<Account, AccountStoreError> {
        let mut accounts = self.inner.write().map_err(|_| poisoned())?;

        if accounts.by_subject.contains_key(&account.external_subject_id) {
            return Err(AccountStoreError::Conflict(account.external_subject_id));
        }

        let account = account.into_account(AccountId::new());
        accounts
            .by_subject
            .insert(account.external_subject_id.clone(), account.id);
        accounts.by_id.insert(account.id, account.clone());
        Ok(account)
    }
}
