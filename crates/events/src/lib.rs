//! Authors Haven notification pipeline.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`delivery`] -- mail and push transports behind the [`Mailer`] and
//!   [`Pusher`] traits.
//! - [`templates`] -- HTML email bodies.
//! - [`policy`] -- pure decision of who hears about an event and how.
//! - [`Notifier`] -- resolves rows and executes a delivery plan.
//! - [`NotificationRouter`] -- drains the bus, one task per event.

pub mod bus;
pub mod delivery;
pub mod notifier;
pub mod policy;
pub mod router;
pub mod templates;

pub use bus::{BusEvent, EventBus};
pub use delivery::email::{EmailConfig, LogMailer, SmtpMailer};
pub use delivery::push::{LogPusher, PusherClient, PusherConfig};
pub use delivery::{DeliveryError, Mailer, OutgoingEmail, PushEvent, Pusher};
pub use notifier::{NotifyError, Notifier};
pub use router::NotificationRouter;
