use std::sync::Arc;

use anyhow::Context;

use fedgate_auth::{AccountStore, Authenticator, IdentityProvider};
use fedgate_infra::{
    account_store::{InMemoryAccountStore, PostgresAccountStore},
    config::AppConfig,
    provider::StaticIdentityProvider,
    session_store::{InMemorySessionStore, SessionStore},
};

/// Long-lived services shared by every request.
pub struct AppServices {
    pub authenticator: Authenticator<Arc<dyn AccountStore>>,
    pub provider: Arc<dyn IdentityProvider>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppServices {
    pub fn new(
        authenticator: Authenticator<Arc<dyn AccountStore>>,
        provider: Arc<dyn IdentityProvider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            authenticator,
            provider,
            sessions,
        }
    }
}

/// Wire services from configuration.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let accounts: Arc<dyn AccountStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresAccountStore::connect(url)
                .await
                .context("connecting to the account database")?;
            tracing::info!("using postgres account store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; accounts are kept in memory and lost on restart");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    // TODO: replace with a provider that performs the OAuth2 code exchange
    // against the token and userinfo endpoints.
    tracing::warn!("no live identity provider configured; callbacks only accept registered codes");
    let provider: Arc<dyn IdentityProvider> = Arc::new(StaticIdentityProvider::from_oauth(&config.oauth));

    Ok(AppServices::new(
        Authenticator::new(accounts, config.signup_gate()),
        provider,
        Arc::new(InMemorySessionStore::with_idle_timeout(config.session_idle_timeout)),
    ))
}
