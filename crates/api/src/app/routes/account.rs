use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Extension, FromRequest, Request},
    http::{StatusCode, header},
    response::IntoResponse,
};

use fedgate_auth::{SessionError, SessionIdentity};

use crate::app::{dto, errors::ErrorBody, services::AppServices};
use crate::context::SessionHandle;

pub async fn home(Extension(identity): Extension<SessionIdentity>) -> axum::response::Response {
    Json(dto::CurrentUserResponse::from(&identity)).into_response()
}

/// Login page data: the pending session error, if any. Reading does not consume it.
pub async fn login_status(Extension(session): Extension<SessionHandle>) -> axum::response::Response {
    let error = session.state().await.error.peek().cloned();
    Json(dto::LoginStatusResponse { error }).into_response()
}

pub async fn logged_in_user(
    Extension(identity): Extension<SessionIdentity>,
) -> axum::response::Response {
    Json(dto::CurrentUserResponse::from(&identity)).into_response()
}

pub async fn logout(Extension(session): Extension<SessionHandle>) -> axum::response::Response {
    session.destroy().await;
    StatusCode::OK.into_response()
}

/// Arm the session for account creation if the sign-up code matches.
///
/// Accepts a JSON or form-encoded body. A body that cannot be read is
/// answered like a wrong code.
pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionHandle>,
    req: Request,
) -> axum::response::Response {
    let code = read_signup_code(req).await;
    let mut state = session.state().await;

    let valid = code
        .as_deref()
        .is_some_and(|code| services.authenticator.gate().is_valid_code(code));

    if !valid {
        tracing::info!(readable = code.is_some(), "sign-up attempted with an invalid code");
        let error = SessionError::invalid_sign_up_code();
        state.error.set(error.clone());
        return ErrorBody(error).into_response();
    }

    state.signup = true;
    StatusCode::OK.into_response()
}

async fn read_signup_code(req: Request) -> Option<String> {
    let is_form = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let Form(body) = Form::<dto::SignUpRequest>::from_request(req, &()).await.ok()?;
        Some(body.code)
    } else {
        let Json(body) = Json::<dto::SignUpRequest>::from_request(req, &()).await.ok()?;
        Some(body.code)
    }
}
