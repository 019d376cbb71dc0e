//! Route guards for protected resources.
//!
//! Guards never decide *why* a caller is rejected. They relay whatever the
//! session's error channel already holds, or fall back to a generic
//! "login required" answer.

use tracing::debug;

use crate::session::SessionState;
use crate::session_error::SessionError;

/// Where unauthenticated page requests are sent.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAccess {
    Allow,
    RedirectTo(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAccess {
    Allow,
    Deny(SessionError),
}

/// Guard for browser-facing pages.
pub fn ensure_authenticated(session: &mut SessionState, authenticated: bool) -> PageAccess {
    if authenticated {
        session.error.clear();
        return PageAccess::Allow;
    }
    debug!("page request without login session; redirecting");
    PageAccess::RedirectTo(LOGIN_PATH)
}

/// Guard for JSON endpoints.
///
/// On denial the relayed error is written back into the channel, so repeated
/// calls keep answering with the same body.
pub fn ensure_api_authenticated(session: &mut SessionState, authenticated: bool) -> ApiAccess {
    if authenticated {
        session.error.clear();
        return ApiAccess::Allow;
    }
    let error = session.error.peek_or(SessionError::login_required());
    session.error.set(error.clone());
    debug!(code = error.code, "api request without login session");
    ApiAccess::Deny(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_guard_redirects_and_keeps_pending_error() {
        let mut session = SessionState::default();
        session.error.set(SessionError::sign_up_limit_exceeded());

        assert_eq!(
            ensure_authenticated(&mut session, false),
            PageAccess::RedirectTo("/login")
        );
        assert_eq!(session.error.peek(), Some(&SessionError::sign_up_limit_exceeded()));
    }

    #[test]
    fn page_guard_allow_clears_error() {
        let mut session = SessionState::default();
        session.error.set(SessionError::unauthorized_login());

        assert_eq!(ensure_authenticated(&mut session, true), PageAccess::Allow);
        assert!(!session.error.is_pending());
    }

    #[test]
    fn api_guard_defaults_to_login_required() {
        let mut session = SessionState::default();
        assert_eq!(
            ensure_api_authenticated(&mut session, false),
            ApiAccess::Deny(SessionError::login_required())
        );
        assert_eq!(session.error.peek(), Some(&SessionError::login_required()));
    }

    #[test]
    fn api_guard_relays_pending_error() {
        let mut session = SessionState::default();
        session.error.set(SessionError::unauthorized_login());

        assert_eq!(
            ensure_api_authenticated(&mut session, false),
            ApiAccess::Deny(SessionError::unauthorized_login())
        );
    }

    #[test]
    fn api_guard_denial_is_idempotent() {
        let mut session = SessionState::default();
        session.error.set(SessionError::data_retrieval_failed());

        let first = ensure_api_authenticated(&mut session, false);
        let second = ensure_api_authenticated(&mut session, false);
        assert_eq!(first, second);

        let mut fresh = SessionState::default();
        assert_eq!(
            ensure_api_authenticated(&mut fresh, false),
            ensure_api_authenticated(&mut fresh, false)
        );
    }

    #[test]
    fn api_guard_allow_clears_error() {
        let mut session = SessionState::default();
        session.error.set(SessionError::login_required());

        assert_eq!(ensure_api_authenticated(&mut session, true), ApiAccess::Allow);
        assert!(!session.error.is_pending());
    }
}
