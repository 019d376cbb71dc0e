//! Configuration loading and representation.
//!
//! Everything is read from the environment. `from_lookup` takes the lookup
//! function explicitly so tests do not have to touch process state.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use fedgate_auth::SignUpGate;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_SIGNUPS: u64 = 10;
const DEFAULT_SESSION_IDLE_SECS: u64 = 24 * 60 * 60;
const DEFAULT_CALLBACK_URL: &str = "http://localhost:8080/auth/google/callback";

const GOOGLE_AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_SCOPES: &str = "https://www.googleapis.com/auth/userinfo.profile https://www.googleapis.com/auth/userinfo.email";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// OAuth client registration with the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl OAuthClientConfig {
    /// Authorization URL for the federation-begin redirect.
    pub fn authorization_url(&self) -> String {
        // Both the endpoint and every parameter are static or validated at load.
        match Url::parse_with_params(
            GOOGLE_AUTHORIZE_ENDPOINT,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("scope", GOOGLE_SCOPES),
            ],
        ) {
            Ok(url) => url.into(),
            Err(_) => GOOGLE_AUTHORIZE_ENDPOINT.to_string(),
        }
    }
}

impl fmt::Debug for OAuthClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

/// Process configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub signup_code: String,
    pub max_signups: u64,
    /// Idle timeout for sessions and lifetime of the session cookie.
    pub session_idle_timeout: Duration,
    pub oauth: OAuthClientConfig,
    /// Accounts live in Postgres when set, in memory otherwise.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let max_signups = match get("FEDGATE_MAX_SIGNUPS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "FEDGATE_MAX_SIGNUPS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_SIGNUPS,
        };

        let session_idle_secs = match get("FEDGATE_SESSION_IDLE_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "FEDGATE_SESSION_IDLE_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        let callback_url = get("OAUTH2_CALLBACK_URL").unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string());
        Url::parse(&callback_url).map_err(|e| ConfigError::Invalid {
            name: "OAUTH2_CALLBACK_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            bind_addr: get("FEDGATE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            signup_code: require("FEDGATE_SIGNUP_CODE")?,
            max_signups,
            session_idle_timeout: Duration::from_secs(session_idle_secs),
            oauth: OAuthClientConfig {
                client_id: require("GOOGLE_CLIENT_ID")?,
                client_secret: require("GOOGLE_CLIENT_SECRET")?,
                callback_url,
            },
            database_url: get("DATABASE_URL"),
        })
    }

    pub fn signup_gate(&self) -> SignUpGate {
        SignUpGate::new(self.signup_code.clone(), self.max_signups)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("signup_code", &"<redacted>")
            .field("max_signups", &self.max_signups)
            .field("session_idle_timeout", &self.session_idle_timeout)
            .field("oauth", &self.oauth)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .finish()
    }
}
