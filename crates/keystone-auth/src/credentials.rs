//! Service credentials for the client-credentials grant

use crate::office365;

/// App-only credentials registered with the identity provider.
///
/// Immutable per-process configuration; a credential with any empty field
/// is treated as not configured and the token provider refuses to operate.
#[derive(Debug, Clone)]
pub struct ServiceCredential {
    /// Application (client) id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Directory (tenant) id issuing the tokens
    pub tenant_id: String,
}

impl ServiceCredential {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// All three fields are non-empty
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.tenant_id.is_empty()
    }

    /// Cache slot identity; the secret deliberately takes no part in it
    pub(crate) fn cache_key(&self) -> String {
        format!("{}:{}", self.client_id, self.tenant_id)
    }

    /// Token endpoint of the tenant's authority
    pub(crate) fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            office365::AUTHORITY_BASE,
            self.tenant_id
        )
    }

    /// Authorization endpoint; required by the client builder, unused by
    /// the client-credentials grant
    pub(crate) fn authorize_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/authorize",
            office365::AUTHORITY_BASE,
            self.tenant_id
        )
    }
}
