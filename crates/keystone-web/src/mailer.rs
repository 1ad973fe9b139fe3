//! Outbound notification glue
//!
//! Turns stored contact messages into admin notification emails. Each send
//! constructs its own transport; the access-token cache is the only state
//! shared between sends. The transport is blocking by design, so all sends
//! run on the blocking thread pool.

use std::sync::Arc;

use keystone_auth::{TokenCache, TokenProvider};
use keystone_core::DbContact;
use keystone_smtp::{AuthStrategy, MailTransport, OutgoingMessage, SmtpError, SmtpResult};
use tracing::warn;

use crate::config::MailConfig;

pub struct Mailer {
    config: MailConfig,
    token_cache: Arc<TokenCache>,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            token_cache: Arc::new(TokenCache::new()),
        }
    }

    fn strategy(&self) -> AuthStrategy {
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => AuthStrategy::Password {
                username: username.clone(),
                password: password.clone(),
            },
            _ => AuthStrategy::OAuth2 {
                sender: self.config.oauth2_sender().to_string(),
                provider: TokenProvider::new(
                    self.config.credential.clone(),
                    Arc::clone(&self.token_cache),
                ),
            },
        }
    }

    fn transport(&self, fail_silently: bool) -> MailTransport {
        MailTransport::new(
            self.config.smtp_host.clone(),
            self.config.smtp_port,
            self.strategy(),
        )
        .tls_mode(self.config.tls)
        .timeout(Some(self.config.timeout))
        .fail_silently(fail_silently)
    }

    /// Notify the site owner about a new contact message.
    ///
    /// Failures are logged by the transport and swallowed; the submission
    /// is already stored and the visitor's request must not fail on mail
    /// trouble.
    pub async fn notify_contact(&self, contact: DbContact) {
        let message = contact_notification(&self.config, &contact);
        let mut transport = self.transport(true);
        let outcome = tokio::task::spawn_blocking(move || transport.send(&message)).await;
        if let Err(join_err) = outcome {
            warn!(contact_id = contact.id, "notification task failed: {}", join_err);
        }
    }

    /// Send a message, surfacing any failure to the caller.
    pub async fn send(&self, message: OutgoingMessage) -> SmtpResult<()> {
        let mut transport = self.transport(false);
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| SmtpError::SendFailed(e.to_string()))?
    }
}

/// Build the admin notification for a stored contact message.
fn contact_notification(config: &MailConfig, contact: &DbContact) -> OutgoingMessage {
    let phone = if contact.phone.is_empty() {
        "not provided".to_string()
    } else {
        contact.phone.clone()
    };

    let text = format!(
        "A new message arrived through the contact form.\n\n\
         Name:    {}\n\
         Email:   {}\n\
         Phone:   {}\n\
         Subject: {}\n\n\
         {}\n",
        contact.name, contact.email, phone, contact.subject, contact.message
    );

    let html = format!(
        "<h2>New contact message</h2>\
         <p><strong>Name:</strong> {}<br>\
         <strong>Email:</strong> {}<br>\
         <strong>Phone:</strong> {}<br>\
         <strong>Subject:</strong> {}</p>\
         <p>{}</p>",
        escape_html(&contact.name),
        escape_html(&contact.email),
        escape_html(&phone),
        escape_html(&contact.subject),
        escape_html(&contact.message)
    );

    OutgoingMessage::new(
        config.default_from.clone(),
        format!("New contact message: {}", contact.subject),
    )
    .from_name("Keystone Properties")
    .to(config.admin_email.clone())
    .reply_to(contact.email.clone())
    .text(text)
    .html(html)
}

/// Visitor-supplied text goes into the HTML body; keep markup out of it.
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
