//! Email delivery via SMTP.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. When `SMTP_HOST`
//! is not set, [`EmailConfig::from_env`] returns `None` and the server
//! falls back to [`LogMailer`].

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{DeliveryError, Mailer, OutgoingEmail};

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "Authors Haven <noreply@authorshaven.local>";

/// Configuration for the SMTP transport.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    /// Defaults to 587.
    pub smtp_port: u16,
    /// RFC 5322 "From" mailbox.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default                                      |
    /// |-----------------|----------|----------------------------------------------|
    /// | `SMTP_HOST`     | yes      | --                                           |
    /// | `SMTP_PORT`     | no       | `587`                                        |
    /// | `SMTP_FROM`     | no       | `Authors Haven <noreply@authorshaven.local>` |
    /// | `SMTP_USER`     | no       | --                                           |
    /// | `SMTP_PASSWORD` | no       | --                                           |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Sends emails through an SMTP relay.
pub struct SmtpMailer {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the pooled STARTTLS transport for the configured relay.
    pub fn new(config: EmailConfig) -> Result<Self, DeliveryError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            config,
        })
    }

    /// Assemble the MIME message.
    ///
    /// A single recipient goes in `To`. Bulk sends address the sender in
    /// `To` and every recipient in `Bcc` so addresses are not disclosed to
    /// each other. Unparseable recipients are skipped; the message fails
    /// only when none is left.
    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, DeliveryError> {
        let from: Mailbox = self.config.from_address.parse()?;
        let mut builder = Message::builder()
            .from(from.clone())
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML);

        let mut recipients = Vec::with_capacity(email.to.len());
        let mut last_error = None;
        for address in &email.to {
            match address.parse::<Mailbox>() {
                Ok(mailbox) => recipients.push(mailbox),
                Err(e) => {
                    tracing::warn!(address = %address, error = %e, "Skipping unparseable recipient");
                    last_error = Some(e);
                }
            }
        }
        if recipients.is_empty() {
            return Err(last_error.map_or_else(
                || DeliveryError::Build("no recipients".to_string()),
                DeliveryError::from,
            ));
        }

        if email.to.len() == 1 {
            for mailbox in recipients {
                builder = builder.to(mailbox);
            }
        } else {
            builder = builder.to(from);
            for mailbox in recipients {
                builder = builder.bcc(mailbox);
            }
        }

        builder
            .body(email.html.clone())
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        if email.to.is_empty() {
            return Ok(());
        }
        let message = self.build_message(email)?;
        self.transport.send(message).await?;
        tracing::info!(recipients = email.to.len(), subject = %email.subject, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LogMailer
// ---------------------------------------------------------------------------

/// Development mailer: logs the email instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        tracing::info!(
            to = ?email.to,
            subject = %email.subject,
            "SMTP not configured, email logged instead of sent"
        );
        tracing::debug!(html = %email.html, "Email body");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            smtp_user: None,
            smtp_password: None,
        }
    }

    fn email(to: &[&str]) -> OutgoingEmail {
        OutgoingEmail {
            to: to.iter().map(|s| s.to_string()).collect(),
            subject: "Hello".to_string(),
            html: "<p>hi</p>".to_string(),
        }
    }

    #[test]
    fn single_recipient_goes_in_to() {
        let mailer = SmtpMailer::new(config()).unwrap();
        let message = mailer.build_message(&email(&["a@example.com"])).unwrap();
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(rendered.contains("To: a@example.com"));
    }

    #[test]
    fn bulk_recipients_are_hidden() {
        let mailer = SmtpMailer::new(config()).unwrap();
        let message = mailer
            .build_message(&email(&["a@example.com", "b@example.com"]))
            .unwrap();
        let envelope = message.envelope();
        assert_eq!(envelope.to().len(), 3);
        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(!rendered.contains("b@example.com"));
    }

    #[test]
    fn invalid_recipient_is_an_address_error() {
        let mailer = SmtpMailer::new(config()).unwrap();
        let err = mailer.build_message(&email(&["not-an-email"])).unwrap_err();
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[test]
    fn unparseable_recipient_does_not_block_the_rest() {
        let mailer = SmtpMailer::new(config()).unwrap();
        let message = mailer
            .build_message(&email(&["a@example.com", "not-an-email", "b@example.com"]))
            .unwrap();
        let delivered: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|address| address.to_string())
            .collect();
        assert_eq!(delivered.len(), 3);
        assert!(delivered.contains(&"a@example.com".to_string()));
        assert!(delivered.contains(&"b@example.com".to_string()));
        assert!(!delivered.iter().any(|address| address.contains("not-an-email")));
    }

    #[test]
    fn all_recipients_unparseable_is_an_address_error() {
        let mailer = SmtpMailer::new(config()).unwrap();
        let err = mailer
            .build_message(&email(&["not-an-email", "also bad"]))
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Address(_)));
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        LogMailer.send(&email(&["a@example.com"])).await.unwrap();
    }
}
