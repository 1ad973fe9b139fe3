//! Error types for token acquisition

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while obtaining an access token
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more of client id, client secret, tenant id is empty
    #[error("OAuth2 credentials not configured: client id, client secret and tenant id are all required")]
    CredentialsNotConfigured,

    /// The identity provider rejected or could not satisfy the grant
    #[error("token acquisition failed: {error}: {description}")]
    TokenAcquisitionFailed { error: String, description: String },

    /// The identity provider could not be reached
    #[error("network error during token acquisition: {0}")]
    Network(String),

    /// Invalid endpoint configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
