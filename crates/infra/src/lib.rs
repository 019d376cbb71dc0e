//! Infrastructure layer: account datastores, session storage, identity
//! provider adapters and configuration.

pub mod account_store;
pub mod config;
pub mod provider;
pub mod session_store;
