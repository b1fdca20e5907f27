//! Push channel naming shared by the notifier and any client that
//! subscribes to it.

use crate::types::DbId;

/// Pusher channel every notification event is published on.
pub const PUSH_CHANNEL: &str = "notifications";

/// Payload carried by every push event. Clients re-fetch their
/// notification list when they receive it.
pub const PUSH_MESSAGE: &str = "You have a notification";

/// Event name a client listens on for pushes addressed to `user_id`.
pub fn push_event_name(user_id: DbId) -> String {
    format!("event-{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_name_embeds_user_id() {
        assert_eq!(push_event_name(42), "event-42");
    }
}
