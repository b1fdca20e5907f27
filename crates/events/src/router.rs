//! Bus consumer that runs the [`Notifier`] for every published event.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::task::TaskTracker;

use crate::bus::BusEvent;
use crate::notifier::Notifier;

/// Routes bus events to the [`Notifier`].
///
/// Each event runs in its own spawned task. Failures are logged and go no
/// further.
pub struct NotificationRouter {
    notifier: Arc<Notifier>,
    tasks: TaskTracker,
}

impl NotificationRouter {
    pub fn new(notifier: Arc<Notifier>) -> Self {
        Self {
            notifier,
            tasks: TaskTracker::new(),
        }
    }

    /// Run the routing loop.
    ///
    /// Exits when the [`EventBus`](crate::bus::EventBus) is dropped, after
    /// waiting for in-flight deliveries to finish.
    pub async fn run(self, mut receiver: broadcast::Receiver<BusEvent>) {
        loop {
            match receiver.recv().await {
                Ok(bus_event) => self.dispatch(bus_event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router draining");
                    break;
                }
            }
        }

        self.tasks.close();
        self.tasks.wait().await;
        tracing::info!("Notification router stopped");
    }

    fn dispatch(&self, bus_event: BusEvent) {
        let notifier = Arc::clone(&self.notifier);
        self.tasks.spawn(async move {
            let event = bus_event.event;
            if let Err(e) = notifier.notify(&event).await {
                tracing::error!(
                    error = %e,
                    kind = event.kind(),
                    sender_id = event.sender_id(),
                    "Failed to deliver notification"
                );
            }
        });
    }
}
