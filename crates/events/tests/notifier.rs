//! Notifier integration tests against a real database with recording
//! transports.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use haven_core::notify::{ArticleAction, NotificationEvent};
use haven_db::models::article::{Article, CreateArticle};
use haven_db::models::user::{CreateUser, User};
use haven_db::repositories::{ArticleRepo, NotificationRepo, UserRepo};
use haven_events::{
    DeliveryError, EventBus, Mailer, NotificationRouter, Notifier, NotifyError, OutgoingEmail,
    PushEvent, Pusher,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Recording transports
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.fail {
            return Err(DeliveryError::Build("relay down".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPusher {
    pushed: Mutex<Vec<PushEvent>>,
}

#[async_trait]
impl Pusher for RecordingPusher {
    async fn trigger(&self, push: &PushEvent) -> Result<(), DeliveryError> {
        self.pushed.lock().unwrap().push(push.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: None,
            first_name: "Jane".to_string(),
            last_name: username.to_string(),
            image: None,
            social: false,
            email_verification_token: None,
        },
    )
    .await
    .unwrap()
}

async fn opted_out(pool: &PgPool, username: &str) -> User {
    let u = user(pool, username).await;
    UserRepo::toggle_email_notify(pool, u.id).await.unwrap();
    UserRepo::toggle_in_app_notify(pool, u.id).await.unwrap().unwrap()
}

async fn article(pool: &PgPool, author_id: i64) -> Article {
    ArticleRepo::create(
        pool,
        &CreateArticle {
            author_id,
            title: "Fearless Concurrency".to_string(),
            description: "d".to_string(),
            body: "b".to_string(),
            image: None,
            category_id: None,
            slug: "fearless-concurrency-abcd1234".to_string(),
            published: true,
        },
    )
    .await
    .unwrap()
}

fn notifier(
    pool: &PgPool,
    mailer: Arc<RecordingMailer>,
    pusher: Arc<RecordingPusher>,
) -> Notifier {
    Notifier::new(pool.clone(), mailer, pusher, "http://localhost:3000/")
}

async fn total_notifications(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_batches_records_and_sends_one_email(pool: PgPool) {
    let author = user(&pool, "author").await;
    let a = user(&pool, "alpha").await;
    let b = user(&pool, "bravo").await;
    opted_out(&pool, "quiet").await;
    let art = article(&pool, author.id).await;

    let mailer = Arc::new(RecordingMailer::default());
    let pusher = Arc::new(RecordingPusher::default());
    notifier(&pool, mailer.clone(), pusher.clone())
        .notify(&NotificationEvent::publish(author.id, art.id))
        .await
        .unwrap();

    // author, alpha and bravo are opted in; quiet is not.
    assert_eq!(total_notifications(&pool).await, 3);
    assert_eq!(NotificationRepo::list_for_receiver(&pool, a.id).await.unwrap().len(), 1);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.len(), 3);
    assert!(sent[0].to.contains(&b.email));
    assert!(sent[0]
        .html
        .contains("http://localhost:3000/articles/fearless-concurrency-abcd1234"));

    assert_eq!(pusher.pushed.lock().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn opted_out_author_receives_nothing(pool: PgPool) {
    let author = opted_out(&pool, "author").await;
    let reader = user(&pool, "reader").await;
    let art = article(&pool, author.id).await;

    let mailer = Arc::new(RecordingMailer::default());
    let pusher = Arc::new(RecordingPusher::default());
    let n = notifier(&pool, mailer.clone(), pusher.clone());

    for action in [ArticleAction::Like, ArticleAction::Dislike, ArticleAction::Comment] {
        n.notify(&NotificationEvent::reaction(reader.id, art.id, action))
            .await
            .unwrap();
    }
    n.notify(&NotificationEvent::follow(reader.id, author.id))
        .await
        .unwrap();

    assert_eq!(total_notifications(&pool).await, 0);
    assert!(mailer.sent.lock().unwrap().is_empty());
    assert!(pusher.pushed.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mail_failure_does_not_skip_other_channels(pool: PgPool) {
    let follower = user(&pool, "follower").await;
    let followed = user(&pool, "followed").await;

    let mailer = Arc::new(RecordingMailer {
        fail: true,
        ..Default::default()
    });
    let pusher = Arc::new(RecordingPusher::default());
    let result = notifier(&pool, mailer.clone(), pusher.clone())
        .notify(&NotificationEvent::follow(follower.id, followed.id))
        .await;

    assert_matches!(result, Err(NotifyError::Delivery(_)));
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    assert_eq!(total_notifications(&pool).await, 1);
    let pushed = pusher.pushed.lock().unwrap();
    assert_eq!(pushed[0].event, format!("event-{}", followed.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_article_is_reported(pool: PgPool) {
    let reader = user(&pool, "reader").await;
    let result = notifier(
        &pool,
        Arc::new(RecordingMailer::default()),
        Arc::new(RecordingPusher::default()),
    )
    .notify(&NotificationEvent::reaction(reader.id, 424_242, ArticleAction::Like))
    .await;

    assert_matches!(result, Err(NotifyError::ArticleNotFound(424_242)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn router_drains_events_before_stopping(pool: PgPool) {
    let reader = user(&pool, "reader").await;
    let author = user(&pool, "author").await;
    let art = article(&pool, author.id).await;

    let pusher = Arc::new(RecordingPusher::default());
    let n = Arc::new(notifier(
        &pool,
        Arc::new(RecordingMailer::default()),
        pusher.clone(),
    ));

    let bus = EventBus::default();
    let handle = tokio::spawn(NotificationRouter::new(n).run(bus.subscribe()));
    bus.publish(NotificationEvent::reaction(reader.id, art.id, ArticleAction::Like));
    drop(bus);
    handle.await.unwrap();

    let pushed = pusher.pushed.lock().unwrap();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].event, format!("event-{}", reader.id));
    assert_eq!(total_notifications(&pool).await, 1);
}
