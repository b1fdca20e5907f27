//! External delivery channels for notifications.
//!
//! The [`Notifier`](crate::Notifier) only sees the [`Mailer`] and
//! [`Pusher`] traits; the concrete transports are chosen at startup from
//! configuration and injected as `Arc<dyn _>`.

use async_trait::async_trait;

pub mod email;
pub mod push;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for mail and push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// A recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The push HTTP request failed (network, DNS, timeout, etc.).
    #[error("Push request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The push service answered with a non-2xx status code.
    #[error("Push service returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A rendered HTML email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// One or more recipient addresses.
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// One realtime push: `event` on `channel` carrying `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    pub channel: String,
    pub event: String,
    pub data: String,
}

// ---------------------------------------------------------------------------
// Transport traits
// ---------------------------------------------------------------------------

/// Sends rendered emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError>;
}

/// Triggers realtime push events.
#[async_trait]
pub trait Pusher: Send + Sync {
    async fn trigger(&self, push: &PushEvent) -> Result<(), DeliveryError>;
}
