//! Identity provider contract.
//!
//! The wire-level OAuth handshake (token exchange, signature checks, profile
//! fetch) belongs to the provider integration. This crate only consumes its
//! result: a verified [`ProviderGrant`], or a failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::identity::ProviderGrant;

/// Query parameters the provider appends to the callback redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// The authorization code, unless the provider reported a failure.
    pub fn authorization_code(&self) -> Result<&str, ProviderError> {
        if let Some(reason) = &self.error {
            return Err(ProviderError::Denied(reason.clone()));
        }
        self.code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(ProviderError::MissingCode)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider denied the request: {0}")]
    Denied(String),

    #[error("callback is missing the authorization code")]
    MissingCode,

    #[error("authorization code was not accepted: {0}")]
    Exchange(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where the federation-begin endpoint sends the browser.
    fn authorization_url(&self) -> String;

    /// Finish the handshake for a callback request.
    async fn complete(&self, callback: &CallbackParams) -> Result<ProviderGrant, ProviderError>;
}

#[async_trait]
impl<P> IdentityProvider for Arc<P>
where
    P: IdentityProvider + ?Sized,
{
    fn authorization_url(&self) -> String {
        (**self).authorization_url()
    }

    async fn complete(&self, callback: &CallbackParams) -> Result<ProviderGrant, ProviderError> {
        (**self).complete(callback).await
    }
}
