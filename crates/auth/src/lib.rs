//! `fedgate-auth`: pure authentication boundary for federated sign-in.
//!
//! This crate is intentionally decoupled from HTTP and storage: datastores
//! and identity providers are reached through the [`AccountStore`] and
//! [`IdentityProvider`] contracts, and all per-session state travels in an
//! explicit [`SessionState`] value.

pub mod authenticate;
pub mod guards;
pub mod identity;
pub mod lifecycle;
pub mod provider;
pub mod session;
pub mod session_error;
pub mod signup;
pub mod store;

pub use authenticate::Authenticator;
pub use guards::{ApiAccess, LOGIN_PATH, PageAccess, ensure_api_authenticated, ensure_authenticated};
pub use identity::{Account, ExternalProfile, NewAccount, ProviderGrant, SessionIdentity, project};
pub use provider::{CallbackParams, IdentityProvider, ProviderError};
pub use session::SessionState;
pub use session_error::{SessionError, SessionErrorChannel};
pub use signup::SignUpGate;
pub use store::{AccountStore, AccountStoreError};
