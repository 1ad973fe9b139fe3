//! Error types for SMTP operations

use thiserror::Error;

/// Result type for SMTP operations
pub type SmtpResult<T> = Result<T, SmtpError>;

/// Errors that can occur while opening a connection or sending mail
#[derive(Debug, Error)]
pub enum SmtpError {
    /// Connection could not be established
    #[error("failed to connect to SMTP server: {0}")]
    ConnectionFailed(String),

    /// TLS negotiation failed
    #[error("TLS error: {0}")]
    Tls(String),

    /// The server rejected the authentication exchange
    #[error("SMTP authentication failed with code {code}: {message}")]
    AuthenticationFailed { code: u16, message: String },

    /// Token acquisition failed before the exchange was attempted
    #[error(transparent)]
    Auth(#[from] keystone_auth::AuthError),

    /// Message transmission was rejected or interrupted
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// An address did not parse
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// MIME assembly failed
    #[error("failed to build message: {0}")]
    MessageBuild(String),
}
