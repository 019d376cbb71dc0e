//! Identity provider adapters.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use fedgate_auth::{CallbackParams, IdentityProvider, ProviderError, ProviderGrant};

use crate::config::OAuthClientConfig;

/// Provider that answers callbacks from a table of pre-registered codes.
///
/// Codes are single-use, like real authorization codes. Used by tests and
/// by the binary until a live provider integration is configured.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    authorization_url: String,
    grants: RwLock<HashMap<String, ProviderGrant>>,
}

impl StaticIdentityProvider {
    pub fn new(authorization_url: impl Into<String>) -> Self {
        Self {
            authorization_url: authorization_url.into(),
            grants: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_oauth(oauth: &OAuthClientConfig) -> Self {
        Self::new(oauth.authorization_url())
    }

    /// Make `code` resolve to `grant` on the next callback that presents it.
    pub fn register(&self, code: impl Into<String>, grant: ProviderGrant) {
        if let Ok(mut grants) = self.grants.write() {
            grants.insert(code.into(), grant);
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    fn authorization_url(&self) -> String {
        self.authorization_url.clone()
    }

    async fn complete(&self, callback: &CallbackParams) -> Result<ProviderGrant, ProviderError> {
        let code = callback.authorization_code()?;
        let mut grants = self
            .grants
            .write()
            .map_err(|_| ProviderError::Exchange("grant table unavailable".to_string()))?;

        let grant = grants
            .remove(code)
            .ok_or_else(|| ProviderError::Exchange("unknown authorization code".to_string()))?;
        debug!(external_subject_id = %grant.profile.external_subject_id, "authorization code redeemed");
        Ok(grant)
    }
}
