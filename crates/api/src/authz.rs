//! API-side session guards.
//!
//! These resolve the session's account key into a [`SessionIdentity`] and
//! hand the decision to the pure guards in `fedgate-auth`. On success the
//! identity is inserted as a request extension for the handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use fedgate_auth::{
    ApiAccess, LOGIN_PATH, PageAccess, SessionIdentity, ensure_api_authenticated,
    ensure_authenticated, lifecycle,
};

use crate::app::errors::ErrorBody;
use crate::app::services::AppServices;
use crate::context::SessionHandle;

/// Guard for browser pages: unauthenticated requests are redirected to login.
pub async fn require_page_session(
    State(services): State<Arc<AppServices>>,
    Extension(session): Extension<SessionHandle>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let identity = current_identity(&services, &session).await;
    let access = ensure_authenticated(&mut *session.state().await, identity.is_some());

    match (access, identity) {
        (PageAccess::Allow, Some(identity)) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        (PageAccess::RedirectTo(path), _) => Redirect::to(path).into_response(),
        (PageAccess::Allow, None) => Redirect::to(LOGIN_PATH).into_response(),
    }
}

/// Guard for JSON endpoints: unauthenticated requests get the pending (or
/// default) session error as the response body.
pub async fn require_api_session(
    State(services): State<Arc<AppServices>>,
    Extension(session): Extension<SessionHandle>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let identity = current_identity(&services, &session).await;
    let access = ensure_api_authenticated(&mut *session.state().await, identity.is_some());

    match (access, identity) {
        (ApiAccess::Allow, Some(identity)) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        (ApiAccess::Deny(error), _) => ErrorBody(error).into_response(),
        (ApiAccess::Allow, None) => {
            ErrorBody(fedgate_auth::SessionError::login_required()).into_response()
        }
    }
}

async fn current_identity(services: &AppServices, session: &SessionHandle) -> Option<SessionIdentity> {
    let key = session.state().await.account?;
    lifecycle::deserialize(services.authenticator.store(), key).await
}
