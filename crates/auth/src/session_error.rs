//! Structured rejection reasons and the single-slot per-session channel that
//! carries them from one request to a later one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user-facing rejection, rendered on the wire as `{title, message, code}`.
///
/// `code` doubles as the HTTP status of the response that carries it.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{title}: {message} ({code})")]
pub struct SessionError {
    pub title: String,
    pub message: String,
    pub code: u16,
}

impl SessionError {
    pub fn new(title: impl Into<String>, message: impl Into<String>, code: u16) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            code,
        }
    }

    /// The account datastore could not be read (lookup or count).
    pub fn data_retrieval_failed() -> Self {
        Self::new("App Error", "Data retrieval failed", 500)
    }

    /// A new account could not be persisted.
    pub fn user_save_failed() -> Self {
        Self::new("App Error", "User save failed", 500)
    }

    /// Unknown identity attempted to log in without an active sign-up.
    pub fn unauthorized_login() -> Self {
        Self::new("Login Error", "Unauthorized user. Login rejected", 401)
    }

    pub fn sign_up_limit_exceeded() -> Self {
        Self::new("Sign Up Error", "Max user sign up exceeded", 401)
    }

    pub fn invalid_sign_up_code() -> Self {
        Self::new(
            "Sign Up Error",
            "Invalid sign up code. Please provide a valid sign up code",
            401,
        )
    }

    /// Default answer for API calls made without a login session.
    pub fn login_required() -> Self {
        Self::new("Login Error", "A valid login session is required", 401)
    }
}

/// Pending-error slot attached to a session.
///
/// Holds at most one [`SessionError`]; a later `set` replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionErrorChannel(Option<SessionError>);

impl SessionErrorChannel {
    pub fn set(&mut self, error: SessionError) {
        self.0 = Some(error);
    }

    /// The pending error, or `fallback` when nothing is pending. Never mutates.
    pub fn peek_or(&self, fallback: SessionError) -> SessionError {
        self.0.clone().unwrap_or(fallback)
    }

    pub fn peek(&self) -> Option<&SessionError> {
        self.0.as_ref()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }
}
