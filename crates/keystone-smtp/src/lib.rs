//! SMTP sending for Keystone
//!
//! Provides a blocking mail transport that owns the connect / STARTTLS /
//! authenticate state machine and submits messages over it. Authentication
//! is either a static username/password or an OAuth2 bearer token presented
//! via the SASL XOAUTH2 mechanism.

mod error;
mod message;
mod transport;
mod xoauth2;

pub use error::{SmtpError, SmtpResult};
pub use message::{build_mime, OutgoingMessage};
pub use transport::{AuthStrategy, MailTransport, TlsMode};
pub use xoauth2::xoauth2_payload;
