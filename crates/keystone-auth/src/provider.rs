//! Token cache and client-credentials acquisition
//!
//! The cache is an explicit object with an injected lifecycle: construct it
//! once at process start and share it (via `Arc`) with every mail transport.
//! One exclusive lock serializes all lookups and populates, so at most one
//! acquisition round-trip is in flight per process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use tracing::{debug, info};

use crate::{office365, AuthError, AuthResult, ServiceCredential};

/// Process-wide access-token cache, keyed by credential identity.
///
/// Entries are opaque bearer strings trusted until explicitly cleared;
/// expiry is provider-managed and not tracked here. A stale entry shows up
/// as a server-side authentication rejection, which the transport reports
/// rather than refreshing behind the caller's back.
#[derive(Default)]
pub struct TokenCache {
    pub(crate) entries: Mutex<HashMap<String, String>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all cached tokens. The next acquisition per credential performs
    /// a fresh network round-trip. Used for forced refresh and test isolation.
    pub fn clear(&self) {
        self.lock_entries().clear();
        info!("access token cache cleared");
    }

    pub(crate) fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().expect("token cache lock poisoned")
    }
}

/// Exchanges service credentials for access tokens, serving cached tokens
/// when the credential identity already has one.
#[derive(Clone)]
pub struct TokenProvider {
    credential: ServiceCredential,
    cache: Arc<TokenCache>,
    token_url: String,
}

impl TokenProvider {
    pub fn new(credential: ServiceCredential, cache: Arc<TokenCache>) -> Self {
        let token_url = credential.token_url();
        Self {
            credential,
            cache,
            token_url,
        }
    }

    /// Override the token endpoint. Production derives it from the tenant
    /// id; tests point it at a local listener.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Return a bearer token for the configured credential.
    ///
    /// Cache hit: no network. Cache miss: exactly one round-trip to the
    /// identity provider, performed while holding the cache lock, then the
    /// token is stored and returned. Nothing is cached on failure.
    pub fn get_access_token(&self) -> AuthResult<String> {
        if !self.credential.is_configured() {
            return Err(AuthError::CredentialsNotConfigured);
        }

        let mut entries = self.cache.lock_entries();
        let key = self.credential.cache_key();

        if let Some(token) = entries.get(&key) {
            debug!("using cached access token");
            return Ok(token.clone());
        }

        info!(tenant = %self.credential.tenant_id, "acquiring access token");
        let token = self.acquire()?;
        entries.insert(key, token.clone());
        info!("access token acquired");
        Ok(token)
    }

    /// One client-credentials grant round-trip.
    fn acquire(&self) -> AuthResult<String> {
        let auth_url = AuthUrl::new(self.credential.authorize_url())
            .map_err(|e| AuthError::InvalidConfig(format!("invalid authorize URL: {}", e)))?;
        let token_url = TokenUrl::new(self.token_url.clone())
            .map_err(|e| AuthError::InvalidConfig(format!("invalid token URL: {}", e)))?;

        let client = BasicClient::new(
            ClientId::new(self.credential.client_id.clone()),
            Some(ClientSecret::new(self.credential.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        let response = client
            .exchange_client_credentials()
            .add_scope(Scope::new(office365::SMTP_SCOPE.to_string()))
            .request(http_client);

        match response {
            Ok(token) => Ok(token.access_token().secret().clone()),
            Err(RequestTokenError::ServerResponse(err)) => {
                Err(AuthError::TokenAcquisitionFailed {
                    error: err.error().to_string(),
                    description: err
                        .error_description()
                        .cloned()
                        .unwrap_or_default(),
                })
            }
            Err(RequestTokenError::Request(err)) => Err(AuthError::Network(err.to_string())),
            Err(RequestTokenError::Parse(err, _)) => Err(AuthError::TokenAcquisitionFailed {
                error: "invalid_response".to_string(),
                description: err.to_string(),
            }),
            Err(RequestTokenError::Other(err)) => Err(AuthError::TokenAcquisitionFailed {
                error: "unknown_error".to_string(),
                description: err,
            }),
        }
    }
}
