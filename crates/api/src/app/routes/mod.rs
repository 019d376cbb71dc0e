use axum::{
    Router,
    routing::{get, post},
};

pub mod account;
pub mod federation;
pub mod system;

/// Routes reachable without a logged-in session.
pub fn session_router() -> Router {
    Router::new()
        .route("/auth/google", get(federation::begin))
        .route("/auth/google/callback", get(federation::callback))
        .route("/login", get(account::login_status))
        .route("/api/logout", post(account::logout))
        .route("/api/signup", post(account::signup))
}

/// Browser pages; wrapped in the page guard by the caller.
pub fn page_router() -> Router {
    Router::new().route("/", get(account::home))
}

/// JSON endpoints; wrapped in the API guard by the caller.
pub fn api_router() -> Router {
    Router::new().route("/api/loggedInUser", get(account::logged_in_user))
}
