//! Notification event descriptors.
//!
//! Handlers describe *what happened*; the notification policy decides who
//! hears about it and how.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A reaction to someone else's article that notifies its author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleAction {
    Like,
    Dislike,
    Comment,
}

impl ArticleAction {
    /// Verb used in the notification text, e.g. "Jane Doe likes your article".
    pub fn verb(self) -> &'static str {
        match self {
            ArticleAction::Like => "likes",
            ArticleAction::Dislike => "dislikes",
            ArticleAction::Comment => "commented on",
        }
    }
}

/// An event that may fan out into notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// `sender_id` started following `followed_user_id`.
    Follow {
        sender_id: DbId,
        followed_user_id: DbId,
    },
    /// `sender_id` published `article_id`.
    Publish { sender_id: DbId, article_id: DbId },
    /// `sender_id` liked, disliked or commented on `article_id`.
    Reaction {
        sender_id: DbId,
        article_id: DbId,
        action: ArticleAction,
    },
}

impl NotificationEvent {
    pub fn follow(sender_id: DbId, followed_user_id: DbId) -> Self {
        NotificationEvent::Follow {
            sender_id,
            followed_user_id,
        }
    }

    pub fn publish(sender_id: DbId, article_id: DbId) -> Self {
        NotificationEvent::Publish {
            sender_id,
            article_id,
        }
    }

    pub fn reaction(sender_id: DbId, article_id: DbId, action: ArticleAction) -> Self {
        NotificationEvent::Reaction {
            sender_id,
            article_id,
            action,
        }
    }

    /// The acting user.
    pub fn sender_id(&self) -> DbId {
        match self {
            NotificationEvent::Follow { sender_id, .. }
            | NotificationEvent::Publish { sender_id, .. }
            | NotificationEvent::Reaction { sender_id, .. } => *sender_id,
        }
    }

    /// Short type name used in logs: `follow`, `publish`, `like`,
    /// `dislike` or `comment`.
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::Follow { .. } => "follow",
            NotificationEvent::Publish { .. } => "publish",
            NotificationEvent::Reaction { action, .. } => match action {
                ArticleAction::Like => "like",
                ArticleAction::Dislike => "dislike",
                ArticleAction::Comment => "comment",
            },
        }
    }
}
