//! Verification of provider-asserted identities.
//!
//! Given a [`ProviderGrant`], decide whether to log an existing account in,
//! create a new account through the sign-up gate, or reject the attempt.
//!
//! ```text
//! LOOKUP ──found──────────────────────────────────────────────▶ SUCCESS
//!   │ not found
//!   ▼
//! SIGNUP_CHECK ──flag unset──▶ REJECT 401 "Unauthorized user"
//!   │ flag set
//!   ▼
//! COUNT_CHECK ──at/over limit──▶ REJECT 401 "Max user sign up exceeded"
//!   │ under limit
//!   ▼
//! CREATE ──ok──▶ SUCCESS
//!        └─fail─▶ REJECT 500 "User save failed"
//! ```
//!
//! A datastore error at LOOKUP or COUNT_CHECK rejects with 500 "Data
//! retrieval failed". Nothing is locked between LOOKUP and CREATE; a racing
//! duplicate create is reported by the datastore as a conflict and ends as
//! an ordinary "User save failed" rejection.

use tracing::{error, info, instrument, warn};

use crate::identity::{NewAccount, ProviderGrant, SessionIdentity, project};
use crate::session::SessionState;
use crate::session_error::SessionError;
use crate::signup::SignUpGate;
use crate::store::AccountStore;

/// The verification state machine, bound to an account store and a gate.
#[derive(Debug, Clone)]
pub struct Authenticator<S> {
    store: S,
    gate: SignUpGate,
}

impl<S> Authenticator<S>
where
    S: AccountStore,
{
    pub fn new(store: S, gate: SignUpGate) -> Self {
        Self { store, gate }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gate(&self) -> &SignUpGate {
        &self.gate
    }

    /// Verify a provider grant for the given session.
    ///
    /// The session's sign-up flag is consulted only when the identity is
    /// unknown. Every rejection is written to the session's error channel
    /// before it is returned; success leaves the channel untouched.
    #[instrument(
        skip_all,
        fields(external_subject_id = %grant.profile.external_subject_id, signup = session.signup)
    )]
    pub async fn verify(
        &self,
        session: &mut SessionState,
        grant: &ProviderGrant,
    ) -> Result<SessionIdentity, SessionError> {
        match self.decide(session.signup, grant).await {
            Ok(identity) => Ok(identity),
            Err(rejection) => {
                session.error.set(rejection.clone());
                Err(rejection)
            }
        }
    }

    async fn decide(
        &self,
        signup: bool,
        grant: &ProviderGrant,
    ) -> Result<SessionIdentity, SessionError> {
        let subject = grant.profile.external_subject_id.as_str();

        let existing = self.store.find_by_external_id(subject).await.map_err(|e| {
            error!(error = %e, "account lookup failed");
            SessionError::data_retrieval_failed()
        })?;

        if let Some(account) = existing {
            info!(account_id = %account.id, "existing account logged in");
            return Ok(project(&account));
        }

        if !signup {
            warn!("login rejected: unknown identity and no sign-up in progress");
            return Err(SessionError::unauthorized_login());
        }

        let count = self.store.count().await.map_err(|e| {
            error!(error = %e, "account count failed");
            SessionError::data_retrieval_failed()
        })?;

        if !self.gate.can_sign_up(count) {
            warn!(count, max = self.gate.max_accounts(), "sign-up limit reached");
            return Err(SessionError::sign_up_limit_exceeded());
        }

        let new_account = NewAccount::from_grant(grant).map_err(|e| {
            warn!(error = %e, "provider profile cannot be saved as an account");
            SessionError::user_save_failed()
        })?;

        let account = self.store.create(new_account).await.map_err(|e| {
            error!(error = %e, "account creation failed");
            SessionError::user_save_failed()
        })?;

        info!(account_id = %account.id, "account created via sign-up");
        Ok(project(&account))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use fedgate_core::AccountId;

    use super::*;
    use crate::identity::{Account, ExternalProfile};
    use crate::store::AccountStoreError;

    /// Fake store with per-operation failure injection.
    #[derive(Default)]
    struct FakeStore {
        accounts: Mutex<Vec<Account>>,
        fail_lookup: bool,
        fail_count: bool,
        fail_create: bool,
        /// Reported instead of the real number of accounts.
        count_override: Option<u64>,
    }

    impl FakeStore {
        fn with_account(account: Account) -> Self {
            Self {
                accounts: Mutex::new(vec![account]),
                ..Default::default()
            }
        }

        fn len(&self) -> usize {
            self.accounts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AccountStore for FakeStore {
        async fn find_by_external_id(
            &self,
            external_subject_id: &str,
        ) -> Result<Option<Account>, AccountStoreError> {
            if self.fail_lookup {
                return Err(AccountStoreError::Unavailable("connection refused".into()));
            }
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.external_subject_id == external_subject_id)
                .cloned())
        }

        async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AccountStoreError> {
            Ok(self.accounts.lock().unwrap().iter().find(|a| a.id == id).cloned())
        }

        async fn count(&self) -> Result<u64, AccountStoreError> {
            if self.fail_count {
                return Err(AccountStoreError::Backend("count timed out".into()));
            }
            let real = self.accounts.lock().unwrap().len() as u64;
            Ok(self.count_override.map(|c| c + real).unwrap_or(real))
        }

        async fn create(&self, account: NewAccount) -> Result<Account, AccountStoreError> {
            if self.fail_create {
                return Err(AccountStoreError::Backend("disk full".into()));
            }
            let account = account.into_account(AccountId::new());
            self.accounts.lock().unwrap().push(account.clone());
            Ok(account)
        }
    }

    fn grant(subject: &str) -> ProviderGrant {
        ProviderGrant {
            profile: ExternalProfile {
                external_subject_id: subject.to_string(),
                emails: vec![format!("{subject}@example.com")],
                given_name: "Grace".to_string(),
                family_name: "Hopper".to_string(),
            },
            access_token: "token-1".to_string(),
        }
    }

    fn registered(subject: &str) -> Account {
        NewAccount::from_grant(&grant(subject))
            .unwrap()
            .into_account(AccountId::new())
    }

    fn gate() -> SignUpGate {
        SignUpGate::new("letmein", 10)
    }

    fn signing_up() -> SessionState {
        SessionState {
            signup: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn lookup_failure_is_data_retrieval_error() {
        let store = FakeStore {
            fail_lookup: true,
            ..Default::default()
        };
        let auth = Authenticator::new(store, gate());
        let mut session = signing_up();

        let err = auth.verify(&mut session, &grant("u1")).await.unwrap_err();
        assert_eq!(err, SessionError::data_retrieval_failed());
        assert_eq!(err.code, 500);
        assert_eq!(session.error.peek(), Some(&err));
    }

    #[tokio::test]
    async fn existing_account_logs_in_without_signup() {
        let account = registered("u1");
        let auth = Authenticator::new(FakeStore::with_account(account.clone()), gate());
        let mut session = SessionState::default();

        let identity = auth.verify(&mut session, &grant("u1")).await.unwrap();
        assert_eq!(identity, project(&account));
        assert!(!session.error.is_pending());
    }

    #[tokio::test]
    async fn existing_account_logs_in_even_when_over_limit() {
        let store = FakeStore {
            count_override: Some(1_000),
            fail_count: true,
            ..FakeStore::with_account(registered("u1"))
        };
        let auth = Authenticator::new(store, gate());

        for signup in [false, true] {
            let mut session = SessionState {
                signup,
                ..Default::default()
            };
            assert!(auth.verify(&mut session, &grant("u1")).await.is_ok());
        }
        assert_eq!(auth.store().len(), 1);
    }

    #[tokio::test]
    async fn success_leaves_pending_error_alone() {
        let auth = Authenticator::new(FakeStore::with_account(registered("u1")), gate());
        let mut session = SessionState::default();
        session.error.set(SessionError::login_required());

        auth.verify(&mut session, &grant("u1")).await.unwrap();
        assert_eq!(session.error.peek(), Some(&SessionError::login_required()));
    }

    #[tokio::test]
    async fn unknown_identity_without_signup_is_rejected() {
        let auth = Authenticator::new(FakeStore::default(), gate());
        let mut session = SessionState::default();

        let err = auth.verify(&mut session, &grant("stranger")).await.unwrap_err();
        assert_eq!(err, SessionError::unauthorized_login());
        assert_eq!(err.message, "Unauthorized user. Login rejected");
        assert_eq!(session.error.peek(), Some(&err));
        assert_eq!(auth.store().len(), 0);
    }

    #[tokio::test]
    async fn count_failure_is_data_retrieval_error() {
        let store = FakeStore {
            fail_count: true,
            ..Default::default()
        };
        let auth = Authenticator::new(store, gate());
        let mut session = signing_up();

        let err = auth.verify(&mut session, &grant("new")).await.unwrap_err();
        assert_eq!(err, SessionError::data_retrieval_failed());
        assert_eq!(auth.store().len(), 0);
    }

    #[tokio::test]
    async fn signup_under_limit_creates_one_account() {
        // 5 accounts, limit 10.
        let store = FakeStore {
            count_override: Some(5),
            ..Default::default()
        };
        let auth = Authenticator::new(store, gate());
        let mut session = signing_up();

        let identity = auth.verify(&mut session, &grant("new")).await.unwrap();
        assert_eq!(identity.display_name, "Hopper, Grace");
        assert_eq!(identity.email, "new@example.com");
        assert_eq!(auth.store().count().await.unwrap(), 6);
        assert!(!session.error.is_pending());

        let stored = auth.store().find_by_external_id("new").await.unwrap().unwrap();
        assert_eq!(stored.id, identity.id);
        assert_eq!(stored.access_token, "token-1");
    }

    #[tokio::test]
    async fn signup_at_limit_is_rejected() {
        // 10 accounts, limit 10.
        let store = FakeStore {
            count_override: Some(10),
            ..Default::default()
        };
        let auth = Authenticator::new(store, gate());
        let mut session = signing_up();

        let err = auth.verify(&mut session, &grant("new")).await.unwrap_err();
        assert_eq!(err, SessionError::sign_up_limit_exceeded());
        assert_eq!(err.code, 401);
        assert_eq!(auth.store().count().await.unwrap(), 10);
        assert_eq!(session.error.peek(), Some(&err));
    }

    #[tokio::test]
    async fn create_failure_is_user_save_error() {
        let store = FakeStore {
            fail_create: true,
            ..Default::default()
        };
        let auth = Authenticator::new(store, gate());
        let mut session = signing_up();

        let err = auth.verify(&mut session, &grant("new")).await.unwrap_err();
        assert_eq!(err, SessionError::user_save_failed());
        assert_eq!(err.code, 500);
        assert_eq!(session.error.peek(), Some(&err));
    }

    #[tokio::test]
    async fn profile_without_email_is_user_save_error() {
        let auth = Authenticator::new(FakeStore::default(), gate());
        let mut session = signing_up();
        let mut no_email = grant("new");
        no_email.profile.emails.clear();

        let err = auth.verify(&mut session, &no_email).await.unwrap_err();
        assert_eq!(err, SessionError::user_save_failed());
        assert_eq!(auth.store().len(), 0);
    }

    #[tokio::test]
    async fn latest_rejection_replaces_earlier_one() {
        let auth = Authenticator::new(FakeStore::default(), SignUpGate::new("c", 0));
        let mut session = SessionState::default();

        auth.verify(&mut session, &grant("a")).await.unwrap_err();
        assert_eq!(session.error.peek(), Some(&SessionError::unauthorized_login()));

        session.signup = true;
        auth.verify(&mut session, &grant("a")).await.unwrap_err();
        assert_eq!(session.error.peek(), Some(&SessionError::sign_up_limit_exceeded()));
    }
}
