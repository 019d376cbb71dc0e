use serde::{Deserialize, Serialize};

use fedgate_core::AccountId;

use crate::identity::SessionIdentity;
use crate::lifecycle;
use crate::session_error::{SessionError, SessionErrorChannel};

/// Per-session context passed explicitly into guards and the authenticator.
///
/// This is everything a session persists between requests. The full
/// [`SessionIdentity`] is never stored; only the account key is, and the
/// identity is re-derived from the datastore on each request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Account key written on successful login.
    pub account: Option<AccountId>,

    /// Set only by a valid sign-up code submission.
    pub signup: bool,

    /// Pending rejection to surface on a later request.
    pub error: SessionErrorChannel,
}

impl SessionState {
    /// Record a completed login: keep the account key and drop any stale error.
    pub fn log_in(&mut self, identity: &SessionIdentity) {
        self.account = Some(lifecycle::serialize(identity));
        self.error.clear();
    }

    /// True when there is nothing worth persisting.
    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }

    /// True when the session holds at most the generic "login required"
    /// answer, which any fresh session would produce again on its own.
    pub fn is_disposable(&self) -> bool {
        self.account.is_none()
            && !self.signup
            && self
                .error
                .peek()
                .is_none_or(|error| *error == SessionError::login_required())
    }
}
