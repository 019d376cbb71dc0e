use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Redirect},
};

use fedgate_auth::{CallbackParams, LOGIN_PATH};

use crate::app::services::AppServices;
use crate::context::SessionHandle;

/// Landing page after a successful login.
const HOME_PATH: &str = "/";

/// Start federation: send the browser to the provider's consent screen.
pub async fn begin(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    Redirect::to(&services.provider.authorization_url()).into_response()
}

/// Provider callback: exchange the code, verify the identity, log in.
pub async fn callback(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionHandle>,
    Query(params): Query<CallbackParams>,
) -> axum::response::Response {
    let grant = match services.provider.complete(&params).await {
        Ok(grant) => grant,
        Err(err) => {
            // Provider failures never touch the session error channel.
            tracing::warn!(error = %err, "identity provider callback failed");
            return Redirect::to(LOGIN_PATH).into_response();
        }
    };

    let verified = {
        let mut state = session.state().await;
        let verified = services.authenticator.verify(&mut state, &grant).await;
        if let Ok(identity) = &verified {
            state.log_in(identity);
        }
        verified
    };

    match verified {
        Ok(_) => {
            session.rotate().await;
            Redirect::to(HOME_PATH).into_response()
        }
        Err(_) => Redirect::to(LOGIN_PATH).into_response(),
    }
}
