//! Outgoing message model and MIME assembly

use lettre::message::{header::ContentType, Mailbox, MultiPart};
use lettre::Message;

use crate::{SmtpError, SmtpResult};

/// Email message to send
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    /// From address
    pub from: String,
    /// From display name
    pub from_name: Option<String>,
    /// To addresses
    pub to: Vec<String>,
    /// Reply-To address
    pub reply_to: Option<String>,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: Option<String>,
    /// HTML body
    pub html_body: Option<String>,
}

impl OutgoingMessage {
    /// Create a new message builder
    pub fn new(from: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            from_name: None,
            to: Vec::new(),
            reply_to: None,
            subject: subject.into(),
            text_body: None,
            html_body: None,
        }
    }

    /// Set the from display name
    pub fn from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = Some(name.into());
        self
    }

    /// Add a To recipient
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Set the Reply-To address
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Set the plain text body
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Set the HTML body
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }
}

/// Assemble a MIME message (multipart/alternative when both bodies are set).
pub fn build_mime(msg: &OutgoingMessage) -> SmtpResult<Message> {
    let from_address = msg
        .from
        .parse()
        .map_err(|e| SmtpError::InvalidAddress(format!("{}: {}", msg.from, e)))?;
    let mut builder = Message::builder()
        .from(Mailbox::new(msg.from_name.clone(), from_address))
        .subject(msg.subject.clone());

    for to in &msg.to {
        let address = to
            .parse()
            .map_err(|e| SmtpError::InvalidAddress(format!("{}: {}", to, e)))?;
        builder = builder.to(Mailbox::new(None, address));
    }

    if let Some(ref reply_to) = msg.reply_to {
        let address = reply_to
            .parse()
            .map_err(|e| SmtpError::InvalidAddress(format!("{}: {}", reply_to, e)))?;
        builder = builder.reply_to(Mailbox::new(None, address));
    }

    let message = match (&msg.text_body, &msg.html_body) {
        (Some(text), Some(html)) => builder.multipart(MultiPart::alternative_plain_html(
            text.clone(),
            html.clone(),
        )),
        (Some(text), None) => builder
            .header(ContentType::TEXT_PLAIN)
            .body(text.clone()),
        (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
        (None, None) => builder
            .header(ContentType::TEXT_PLAIN)
            .body(String::new()),
    };

    message.map_err(|e| SmtpError::MessageBuild(e.to_string()))
}
