//! Notification policy: who hears about an event, and on which channel.
//!
//! Everything in here is pure. The [`Notifier`](crate::Notifier) loads the
//! users and article an event refers to, asks this module for a
//! [`DeliveryPlan`], and executes it.
//!
//! | event                       | email                     | in-app record | push keyed to  |
//! |-----------------------------|---------------------------|---------------|----------------|
//! | follow                      | followed, if opted in     | followed      | followed user  |
//! | publish                     | every email opt-in        | every in-app opt-in | each record receiver |
//! | like / dislike / comment    | author, if opted in       | author        | acting user    |

use haven_core::channels::{push_event_name, PUSH_CHANNEL, PUSH_MESSAGE};
use haven_core::notify::ArticleAction;
use haven_core::types::DbId;
use haven_db::models::article::Article;
use haven_db::models::notification::NewNotification;
use haven_db::models::user::User;

use crate::delivery::PushEvent;
use crate::templates::escape_html;

/// One email carrying an HTML message and a link, to one or more addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailNotice {
    pub recipients: Vec<String>,
    /// HTML fragment; user-provided text is already escaped.
    pub message: String,
    /// App-relative path, e.g. `/articles/my-post-x1y2z3w4`.
    pub link: String,
}

/// Everything one event should produce, per channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryPlan {
    pub email: Option<EmailNotice>,
    /// Written as a single batched insert.
    pub records: Vec<NewNotification>,
    pub pushes: Vec<PushEvent>,
}

impl DeliveryPlan {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.records.is_empty() && self.pushes.is_empty()
    }
}

fn push_for(user_id: DbId) -> PushEvent {
    PushEvent {
        channel: PUSH_CHANNEL.to_string(),
        event: push_event_name(user_id),
        data: PUSH_MESSAGE.to_string(),
    }
}

pub fn profile_link(username: &str) -> String {
    format!("/profile/{username}")
}

pub fn article_link(slug: &str) -> String {
    format!("/articles/{slug}")
}

/// `sender` started following `followed`.
pub fn plan_follow(sender: &User, followed: &User) -> DeliveryPlan {
    let link = profile_link(&sender.username);
    let mut plan = DeliveryPlan::default();

    if followed.email_notify {
        plan.email = Some(EmailNotice {
            recipients: vec![followed.email.clone()],
            message: format!(
                "<strong>{}</strong> is following you",
                escape_html(&sender.full_name())
            ),
            link: link.clone(),
        });
    }

    if followed.in_app_notify {
        plan.records.push(NewNotification {
            sender_id: sender.id,
            receiver_id: followed.id,
            message: format!("{} is following you", sender.full_name()),
            link,
        });
        plan.pushes.push(push_for(followed.id));
    }

    plan
}

/// `sender` published `article`.
///
/// Candidates are every opted-in user in the system, not only the
/// sender's followers. `in_app_ids` and `email_addresses` are the already
/// filtered opt-in lists.
pub fn plan_publish(
    sender: &User,
    article: &Article,
    in_app_ids: &[DbId],
    email_addresses: Vec<String>,
) -> DeliveryPlan {
    let link = article_link(&article.slug);
    let name = sender.full_name();

    let email = (!email_addresses.is_empty()).then(|| EmailNotice {
        recipients: email_addresses,
        message: format!(
            "{} published a new article titled <strong>{}</strong>",
            escape_html(&name),
            escape_html(&article.title)
        ),
        link: link.clone(),
    });

    let message = format!("{name} published a new article titled \"{}\"", article.title);
    let records = in_app_ids
        .iter()
        .map(|&receiver_id| NewNotification {
            sender_id: sender.id,
            receiver_id,
            message: message.clone(),
            link: link.clone(),
        })
        .collect();
    let pushes = in_app_ids.iter().map(|&id| push_for(id)).collect();

    DeliveryPlan {
        email,
        records,
        pushes,
    }
}

/// `sender` liked, disliked or commented on `article`, written by `author`.
///
/// The push is keyed to the acting user, not the author.
pub fn plan_reaction(
    sender: &User,
    article: &Article,
    author: &User,
    action: ArticleAction,
) -> DeliveryPlan {
    let link = article_link(&article.slug);
    let name = sender.full_name();
    let verb = action.verb();
    let mut plan = DeliveryPlan::default();

    if author.email_notify {
        plan.email = Some(EmailNotice {
            recipients: vec![author.email.clone()],
            message: format!(
                "{} {verb} your article titled <strong>{}</strong>",
                escape_html(&name),
                escape_html(&article.title)
            ),
            link: link.clone(),
        });
    }

    if author.in_app_notify {
        plan.records.push(NewNotification {
            sender_id: sender.id,
            receiver_id: author.id,
            message: format!("{name} {verb} your article titled \"{}\"", article.title),
            link,
        });
        plan.pushes.push(push_for(sender.id));
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: DbId, first: &str, email_notify: bool, in_app_notify: bool) -> User {
        User {
            id,
            username: first.to_lowercase(),
            email: format!("{}@example.com", first.to_lowercase()),
            password_hash: None,
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            bio: None,
            image: None,
            role: "user".to_string(),
            social: false,
            activated: true,
            is_active: true,
            email_verification_token: None,
            password_reset_token: None,
            password_reset_expires_at: None,
            email_notify,
            in_app_notify,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn article(author_id: DbId) -> Article {
        Article {
            id: 11,
            title: "Ownership in Practice".to_string(),
            description: "d".to_string(),
            slug: "ownership-in-practice-abcd1234".to_string(),
            body: "b".to_string(),
            image: None,
            author_id,
            category_id: None,
            published: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fully_opted_out_user_gets_nothing() {
        let sender = user(1, "Jane", true, true);
        let quiet = user(2, "John", false, false);
        let art = article(quiet.id);

        assert!(plan_follow(&sender, &quiet).is_empty());
        for action in [ArticleAction::Like, ArticleAction::Dislike, ArticleAction::Comment] {
            assert!(plan_reaction(&sender, &art, &quiet, action).is_empty());
        }
        assert!(plan_publish(&sender, &art, &[], vec![]).is_empty());
    }

    #[test]
    fn follow_notifies_followed_user() {
        let sender = user(1, "Jane", true, true);
        let followed = user(2, "John", true, true);
        let plan = plan_follow(&sender, &followed);

        let email = plan.email.unwrap();
        assert_eq!(email.recipients, vec!["john@example.com".to_string()]);
        assert_eq!(email.message, "<strong>Jane Doe</strong> is following you");
        assert_eq!(email.link, "/profile/jane");

        assert_eq!(plan.records.len(), 1);
        assert_eq!(plan.records[0].receiver_id, 2);
        assert_eq!(plan.records[0].message, "Jane Doe is following you");
    }

    #[test]
    fn follow_push_is_keyed_to_followed_user() {
        let plan = plan_follow(&user(1, "Jane", false, true), &user(2, "John", false, true));
        assert_eq!(plan.pushes, vec![push_for(2)]);
        assert_eq!(plan.pushes[0].event, "event-2");
        assert_eq!(plan.pushes[0].channel, "notifications");
        assert_eq!(plan.pushes[0].data, "You have a notification");
    }

    #[test]
    fn like_push_is_keyed_to_acting_user() {
        let sender = user(1, "Jane", true, true);
        let author = user(2, "John", false, true);
        let plan = plan_reaction(&sender, &article(2), &author, ArticleAction::Like);

        assert_eq!(plan.pushes[0].event, "event-1");
        assert_eq!(plan.records[0].receiver_id, 2);
        assert_eq!(
            plan.records[0].message,
            "Jane Doe likes your article titled \"Ownership in Practice\""
        );
        assert!(plan.email.is_none());
    }

    #[test]
    fn comment_email_uses_verb_and_bold_title() {
        let sender = user(1, "Jane", true, true);
        let author = user(2, "John", true, false);
        let plan = plan_reaction(&sender, &article(2), &author, ArticleAction::Comment);

        let email = plan.email.unwrap();
        assert_eq!(
            email.message,
            "Jane Doe commented on your article titled <strong>Ownership in Practice</strong>"
        );
        assert_eq!(email.link, "/articles/ownership-in-practice-abcd1234");
        assert!(plan.records.is_empty());
        assert!(plan.pushes.is_empty());
    }

    #[test]
    fn publish_targets_every_opted_in_user() {
        let sender = user(1, "Jane", true, true);
        let art = article(1);
        let emails = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        let plan = plan_publish(&sender, &art, &[3, 4, 5], emails.clone());

        assert_eq!(plan.records.len(), 3);
        assert!(plan.records.iter().all(|r| r.sender_id == 1
            && r.message == "Jane Doe published a new article titled \"Ownership in Practice\""));
        assert_eq!(
            plan.pushes.iter().map(|p| p.event.as_str()).collect::<Vec<_>>(),
            ["event-3", "event-4", "event-5"]
        );

        let email = plan.email.unwrap();
        assert_eq!(email.recipients, emails);
        assert_eq!(
            email.message,
            "Jane Doe published a new article titled <strong>Ownership in Practice</strong>"
        );
    }

    #[test]
    fn email_text_is_escaped() {
        let mut sender = user(1, "Jane", true, true);
        sender.last_name = "<b>".to_string();
        let plan = plan_follow(&sender, &user(2, "John", true, true));
        assert_eq!(
            plan.email.unwrap().message,
            "<strong>Jane &lt;b&gt;</strong> is following you"
        );
        assert_eq!(plan.records[0].message, "Jane <b> is following you");
    }
}
