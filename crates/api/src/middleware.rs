use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};

use fedgate_core::SessionId;

use crate::app::services::AppServices;
use crate::context::{SessionHandle, SessionOutcome};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "fedgate.sid";

/// Load the caller's session, run the request, persist what is left.
pub async fn session_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let handle = extract_session_id(req.headers())
        .and_then(|id| services.sessions.load(id).map(|state| (id, state)))
        .map(|(id, state)| SessionHandle::existing(id, state))
        .unwrap_or_else(SessionHandle::fresh);

    req.extensions_mut().insert(handle.clone());
    let mut response = next.run(req).await;

    let outcome = handle.outcome().await;
    if let Some(cookie) = persist(&services, outcome) {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

/// Write the session back to the store; returns the `Set-Cookie` to send, if any.
fn persist(services: &AppServices, outcome: SessionOutcome) -> Option<HeaderValue> {
    if let Some(retired) = outcome.retired {
        services.sessions.destroy(retired);
    }

    if outcome.destroyed {
        services.sessions.destroy(outcome.id);
        return (!outcome.is_new).then(expired_cookie);
    }

    // Nothing to remember about a client we have not met before.
    if outcome.is_new && outcome.state.is_disposable() {
        return None;
    }

    services.sessions.save(outcome.id, outcome.state);
    let max_age = services.sessions.idle_timeout();
    outcome.is_new.then(|| session_cookie(outcome.id, max_age))
}

fn session_cookie(id: SessionId, max_age: Duration) -> HeaderValue {
    let value = format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| expired_cookie())
}

fn expired_cookie() -> HeaderValue {
    HeaderValue::from_static("fedgate.sid=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn extract_session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}
