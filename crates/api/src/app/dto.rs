use serde::{Deserialize, Serialize};

use fedgate_auth::{SessionError, SessionIdentity};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    /// A missing code is treated like a wrong one.
    #[serde(default, alias = "signUpCode")]
    pub code: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub name: String,
    pub email: String,
}

impl From<&SessionIdentity> for CurrentUserResponse {
    fn from(identity: &SessionIdentity) -> Self {
        Self {
            name: identity.display_name.clone(),
            email: identity.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginStatusResponse {
    pub error: Option<SessionError>,
}
