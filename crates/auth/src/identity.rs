//! Identity shapes: what the provider asserts, what the datastore keeps, and
//! what a session carries.

use serde::{Deserialize, Serialize};

use fedgate_core::{AccountId, DomainError, DomainResult};

/// Provider-asserted identity. Read-only; lives for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
    pub external_subject_id: String,
    pub emails: Vec<String>,
    pub given_name: String,
    pub family_name: String,
}

/// Outcome of a successful provider handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderGrant {
    pub profile: ExternalProfile,
    pub access_token: String,
}

/// A persisted account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Unique across all accounts (datastore-enforced).
    pub external_subject_id: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub access_token: String,
}

/// Fields needed to create an [`Account`]; the datastore assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub external_subject_id: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub access_token: String,
}

impl NewAccount {
    /// Build creation fields from a grant, taking the profile's first email.
    pub fn from_grant(grant: &ProviderGrant) -> DomainResult<Self> {
        let profile = &grant.profile;
        let email = profile
            .emails
            .first()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DomainError::validation("provider profile carries no email"))?;

        Ok(Self {
            external_subject_id: profile.external_subject_id.clone(),
            email: email.to_string(),
            given_name: profile.given_name.clone(),
            family_name: profile.family_name.clone(),
            access_token: grant.access_token.clone(),
        })
    }

    /// Attach a datastore-assigned id.
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            external_subject_id: self.external_subject_id,
            email: self.email,
            given_name: self.given_name,
            family_name: self.family_name,
            access_token: self.access_token,
        }
    }
}

/// Minimal identity carried by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub id: AccountId,
    pub display_name: String,
    pub email: String,
    pub token: String,
}

/// Project a persisted account into its session-carried form.
pub fn project(account: &Account) -> SessionIdentity {
    SessionIdentity {
        id: account.id,
        display_name: format!("{}, {}", account.family_name, account.given_name),
        email: account.email.clone(),
        token: account.access_token.clone(),
    }
}
