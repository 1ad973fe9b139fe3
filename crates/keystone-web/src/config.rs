//! Configuration for the Keystone website

use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

use keystone_auth::{office365, ServiceCredential};
use keystone_smtp::TlsMode;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// SQLite database path
    pub database_path: String,
    /// Bearer token guarding the admin API; admin routes reject every
    /// request while unset
    pub admin_token: Option<String>,
    /// Outbound mail configuration
    pub mail: MailConfig,
}

/// Outbound mail configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub tls: TlsMode,
    /// Connect/read timeout on the SMTP socket
    pub timeout: Duration,
    /// Static SMTP username; presence of both username and password
    /// selects password auth over OAuth2
    pub username: Option<String>,
    pub password: Option<String>,
    /// OAuth2 service credential for the XOAUTH2 path
    pub credential: ServiceCredential,
    /// From address on outgoing mail
    pub default_from: String,
    /// Recipient of contact-form notifications
    pub admin_email: String,
}

impl Config {
    /// Load configuration from the environment
    pub fn from_env() -> Result<Self> {
        let http_host = env_or("HTTP_HOST", "0.0.0.0");
        let http_port = env_or("HTTP_PORT", "8080")
            .parse()
            .context("HTTP_PORT must be a port number")?;
        let database_path = env_or("DATABASE_PATH", "data/keystone.db");
        let admin_token = optional("ADMIN_API_TOKEN");

        let smtp_port = env_or("SMTP_PORT", &office365::SMTP_PORT.to_string())
            .parse()
            .context("SMTP_PORT must be a port number")?;
        let tls = parse_tls_mode(&env_or("SMTP_TLS", "starttls"))?;
        let timeout_secs: u64 = env_or("SMTP_TIMEOUT_SECS", "60")
            .parse()
            .context("SMTP_TIMEOUT_SECS must be a number of seconds")?;

        let mail = MailConfig {
            smtp_host: env_or("SMTP_HOST", office365::SMTP_HOST),
            smtp_port,
            tls,
            timeout: Duration::from_secs(timeout_secs),
            username: optional("SMTP_USERNAME"),
            password: optional("SMTP_PASSWORD"),
            credential: ServiceCredential::new(
                env_or("MICROSOFT_CLIENT_ID", ""),
                env_or("MICROSOFT_CLIENT_SECRET", ""),
                env_or("MICROSOFT_TENANT_ID", ""),
            ),
            default_from: env::var("DEFAULT_FROM_EMAIL")
                .context("DEFAULT_FROM_EMAIL must be set")?,
            admin_email: env::var("ADMIN_EMAIL").context("ADMIN_EMAIL must be set")?,
        };

        Ok(Self {
            http_host,
            http_port,
            database_path,
            admin_token,
            mail,
        })
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl MailConfig {
    /// Both static credentials are present, so password auth applies
    pub fn has_password_auth(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Mailbox to authenticate as on the XOAUTH2 path: the configured
    /// username when present, the from address otherwise
    pub fn oauth2_sender(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.default_from)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an env var, treating empty values as unset
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_tls_mode(value: &str) -> Result<TlsMode> {
    match value.to_ascii_lowercase().as_str() {
        "none" => Ok(TlsMode::None),
        "starttls" => Ok(TlsMode::StartTls),
        "implicit" | "ssl" => Ok(TlsMode::Implicit),
        other => bail!("SMTP_TLS must be one of none/starttls/implicit, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tls_mode() {
        assert_eq!(parse_tls_mode("starttls").unwrap(), TlsMode::StartTls);
        assert_eq!(parse_tls_mode("NONE").unwrap(), TlsMode::None);
        assert_eq!(parse_tls_mode("ssl").unwrap(), TlsMode::Implicit);
        assert!(parse_tls_mode("opportunistic").is_err());
    }

    #[test]
    fn test_oauth2_sender_falls_back_to_from_address() {
        let mut mail = MailConfig {
            smtp_host: office365::SMTP_HOST.to_string(),
            smtp_port: office365::SMTP_PORT,
            tls: TlsMode::StartTls,
            timeout: Duration::from_secs(60),
            username: None,
            password: None,
            credential: ServiceCredential::new("", "", ""),
            default_from: "noreply@example.com".to_string(),
            admin_email: "owner@example.com".to_string(),
        };
        assert_eq!(mail.oauth2_sender(), "noreply@example.com");
        assert!(!mail.has_password_auth());

        mail.username = Some("mailer@example.com".to_string());
        assert_eq!(mail.oauth2_sender(), "mailer@example.com");
        assert!(!mail.has_password_auth(), "username alone stays on OAuth2");
    }
}
