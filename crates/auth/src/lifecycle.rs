//! Session identity across requests.
//!
//! Only the account key crosses the request boundary. On every request the
//! identity is rebuilt from the datastore, so a client can never smuggle in
//! a name, email or token of its own.

use tracing::{debug, instrument, warn};

use fedgate_core::AccountId;

use crate::identity::{SessionIdentity, project};
use crate::store::AccountStore;

/// The durable key a session keeps for `identity`.
pub fn serialize(identity: &SessionIdentity) -> AccountId {
    identity.id
}

/// Re-fetch and re-project the account behind `key`.
///
/// `None` means the session is treated as logged out: the account is gone or
/// the datastore could not answer.
#[instrument(skip(store), fields(account_id = %key))]
pub async fn deserialize<S>(store: &S, key: AccountId) -> Option<SessionIdentity>
where
    S: AccountStore + ?Sized,
{
    match store.find_by_id(key).await {
        Ok(Some(account)) => Some(project(&account)),
        Ok(None) => {
            debug!("session refers to an account that no longer exists");
            None
        }
        Err(e) => {
            warn!(error = %e, "failed to restore session identity");
            None
        }
    }
}
