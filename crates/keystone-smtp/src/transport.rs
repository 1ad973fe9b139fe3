//! Authenticated SMTP transport
//!
//! Owns one server connection and the state machine around it:
//! Closed -> Connecting -> TlsNegotiating (optional) -> Authenticating ->
//! Open. Any failure on the way tears the partial connection down and
//! reports per the `fail_silently` policy.

use std::time::Duration;

use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::transport::smtp::response::Code;
use tracing::{debug, error, info};

use keystone_auth::{office365, TokenProvider};

use crate::message::build_mime;
use crate::xoauth2::xoauth2_payload;
use crate::{OutgoingMessage, SmtpError, SmtpResult};

/// Reply code for a successful authentication exchange
const AUTH_SUCCEEDED: u16 = 235;

/// Transport-layer encryption mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Plaintext session (local relays and tests)
    None,
    /// Connect in the clear, then upgrade via STARTTLS
    StartTls,
    /// TLS from the first byte (SMTPS ports)
    Implicit,
}

/// How the transport authenticates once the session is encrypted.
///
/// Injected into the transport rather than baked into it, so the
/// connect/TLS/send logic is shared by both mechanisms.
pub enum AuthStrategy {
    /// Static username/password pass-through (PLAIN/LOGIN)
    Password { username: String, password: String },
    /// OAuth2 bearer token for `sender`, presented as SASL XOAUTH2
    OAuth2 {
        sender: String,
        provider: TokenProvider,
    },
}

impl AuthStrategy {
    /// Mailbox the server will see as the authenticated identity
    pub fn identity(&self) -> &str {
        match self {
            AuthStrategy::Password { username, .. } => username,
            AuthStrategy::OAuth2 { sender, .. } => sender,
        }
    }
}

/// Blocking SMTP transport bound to one server and one auth strategy.
///
/// Each concurrent sender owns its own transport; only the token cache
/// behind an `OAuth2` strategy is shared state.
pub struct MailTransport {
    host: String,
    port: u16,
    tls: TlsMode,
    timeout: Option<Duration>,
    fail_silently: bool,
    auth: AuthStrategy,
    connection: Option<SmtpConnection>,
}

impl MailTransport {
    pub fn new(host: impl Into<String>, port: u16, auth: AuthStrategy) -> Self {
        Self {
            host: host.into(),
            port,
            tls: TlsMode::StartTls,
            timeout: Some(Duration::from_secs(60)),
            fail_silently: false,
            auth,
            connection: None,
        }
    }

    /// Office 365 submission endpoint
    pub fn office365(auth: AuthStrategy) -> Self {
        Self::new(office365::SMTP_HOST, office365::SMTP_PORT, auth)
    }

    pub fn tls_mode(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    /// Connect/read timeout on the underlying socket
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// When set, `open()` and `send()` log failures and return instead of
    /// propagating them.
    pub fn fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Establish and authenticate the connection.
    ///
    /// Returns `false` without touching the network when already open,
    /// `true` once a fresh connection reaches the Open state. On failure
    /// the partial connection is torn down; with `fail_silently` the error
    /// is logged and `false` returned instead.
    pub fn open(&mut self) -> SmtpResult<bool> {
        if self.connection.is_some() {
            return Ok(false);
        }

        match self.try_open() {
            Ok(()) => {
                info!(host = %self.host, port = self.port, "SMTP connection open");
                Ok(true)
            }
            Err(err) => {
                self.close();
                error!(host = %self.host, "failed to open SMTP connection: {}", err);
                if self.fail_silently {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Close the connection, swallowing close-time errors.
    pub fn close(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            let _ = conn.quit();
            debug!(host = %self.host, "SMTP connection closed");
        }
    }

    /// Send one message: open, transmit, close.
    ///
    /// Delivery failure is reported to the caller unless `fail_silently`
    /// is set, in which case it is logged and swallowed.
    pub fn send(&mut self, message: &OutgoingMessage) -> SmtpResult<()> {
        self.open()?;
        let result = self.transmit(message);
        self.close();

        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                error!("failed to send message: {}", err);
                if self.fail_silently {
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }

    fn try_open(&mut self) -> SmtpResult<()> {
        let hello = ClientId::default();
        debug!(host = %self.host, port = self.port, tls = ?self.tls, "connecting");

        let mut conn = match self.tls {
            TlsMode::Implicit => {
                let tls = self.tls_parameters()?;
                SmtpConnection::connect(
                    (self.host.as_str(), self.port),
                    self.timeout,
                    &hello,
                    Some(&tls),
                    None,
                )
                .map_err(|e| SmtpError::ConnectionFailed(e.to_string()))?
            }
            TlsMode::StartTls => {
                let tls = self.tls_parameters()?;
                let mut conn = SmtpConnection::connect(
                    (self.host.as_str(), self.port),
                    self.timeout,
                    &hello,
                    None,
                    None,
                )
                .map_err(|e| SmtpError::ConnectionFailed(e.to_string()))?;
                conn.starttls(&tls, &hello)
                    .map_err(|e| SmtpError::Tls(e.to_string()))?;
                conn
            }
            TlsMode::None => SmtpConnection::connect(
                (self.host.as_str(), self.port),
                self.timeout,
                &hello,
                None,
                None,
            )
            .map_err(|e| SmtpError::ConnectionFailed(e.to_string()))?,
        };

        if let Err(err) = Self::authenticate(&mut conn, &self.auth) {
            let _ = conn.quit();
            return Err(err);
        }

        self.connection = Some(conn);
        Ok(())
    }

    fn authenticate(conn: &mut SmtpConnection, auth: &AuthStrategy) -> SmtpResult<()> {
        match auth {
            AuthStrategy::Password { username, password } => {
                info!(username = %username, "authenticating with password login");
                let credentials = Credentials::new(username.clone(), password.clone());
                conn.auth(&[Mechanism::Plain, Mechanism::Login], &credentials)
                    .map_err(auth_failure)?;
            }
            AuthStrategy::OAuth2 { sender, provider } => {
                info!(sender = %sender, "authenticating with XOAUTH2");
                let access_token = provider.get_access_token()?;
                let payload = xoauth2_payload(sender, &access_token);

                let response = conn
                    .command(format!("AUTH XOAUTH2 {}", payload))
                    .map_err(auth_failure)?;

                let code = code_as_u16(response.code());
                if code != AUTH_SUCCEEDED {
                    return Err(SmtpError::AuthenticationFailed {
                        code,
                        message: response.message().collect::<Vec<_>>().join(" "),
                    });
                }
            }
        }

        info!("SMTP authentication successful");
        Ok(())
    }

    fn tls_parameters(&self) -> SmtpResult<TlsParameters> {
        TlsParameters::new(self.host.clone()).map_err(|e| SmtpError::Tls(e.to_string()))
    }

    fn transmit(&mut self, message: &OutgoingMessage) -> SmtpResult<()> {
        // open() may have swallowed a failure under fail_silently
        let Some(conn) = self.connection.as_mut() else {
            return Ok(());
        };

        let mime = build_mime(message)?;
        conn.send(&mime.envelope(), &mime.formatted())
            .map_err(|e| SmtpError::SendFailed(e.to_string()))?;

        info!(to = ?message.to, subject = %message.subject, "message sent");
        Ok(())
    }
}

/// Map a rejected exchange to `AuthenticationFailed`, keeping the server's
/// reply code when the error carries one.
fn auth_failure(err: lettre::transport::smtp::Error) -> SmtpError {
    match err.status() {
        Some(code) => SmtpError::AuthenticationFailed {
            code: code_as_u16(code),
            message: err.to_string(),
        },
        None => SmtpError::ConnectionFailed(err.to_string()),
    }
}

fn code_as_u16(code: Code) -> u16 {
    code.to_string().parse().unwrap_or_default()
}
