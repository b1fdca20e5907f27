//! Executes notification plans against the database and transports.

use std::sync::Arc;

use haven_core::notify::NotificationEvent;
use haven_core::types::DbId;
use haven_db::models::article::Article;
use haven_db::models::user::User;
use haven_db::repositories::{ArticleRepo, NotificationRepo, UserRepo};
use haven_db::DbPool;

use crate::delivery::{DeliveryError, Mailer, Pusher};
use crate::policy::{self, DeliveryPlan};
use crate::templates;

/// Error type for a single notification run.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("User {0} does not exist")]
    UserNotFound(DbId),

    #[error("Article {0} does not exist")]
    ArticleNotFound(DbId),
}

/// Resolves the rows an event refers to and delivers on every channel the
/// policy selects.
pub struct Notifier {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
    pusher: Arc<dyn Pusher>,
    /// Origin of the web client, prefixed to links in emails.
    app_url: String,
}

impl Notifier {
    pub fn new(
        pool: DbPool,
        mailer: Arc<dyn Mailer>,
        pusher: Arc<dyn Pusher>,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            mailer,
            pusher,
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build and execute the plan for one event.
    ///
    /// Channels are attempted independently: a failed email does not skip
    /// the in-app records or pushes. The first channel error is returned
    /// after all channels have been attempted.
    pub async fn notify(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let plan = self.plan(event).await?;
        if plan.is_empty() {
            tracing::debug!(kind = event.kind(), "No recipients for event");
            return Ok(());
        }
        self.execute(plan).await
    }

    async fn plan(&self, event: &NotificationEvent) -> Result<DeliveryPlan, NotifyError> {
        match *event {
            NotificationEvent::Follow {
                sender_id,
                followed_user_id,
            } => {
                let sender = self.user(sender_id).await?;
                let followed = self.user(followed_user_id).await?;
                Ok(policy::plan_follow(&sender, &followed))
            }
            NotificationEvent::Publish {
                sender_id,
                article_id,
            } => {
                let sender = self.user(sender_id).await?;
                let article = self.article(article_id).await?;
                let in_app_ids = UserRepo::list_in_app_recipient_ids(&self.pool).await?;
                let emails = UserRepo::list_email_recipient_addresses(&self.pool).await?;
                Ok(policy::plan_publish(&sender, &article, &in_app_ids, emails))
            }
            NotificationEvent::Reaction {
                sender_id,
                article_id,
                action,
            } => {
                let sender = self.user(sender_id).await?;
                let article = self.article(article_id).await?;
                let author = self.user(article.author_id).await?;
                Ok(policy::plan_reaction(&sender, &article, &author, action))
            }
        }
    }

    async fn execute(&self, plan: DeliveryPlan) -> Result<(), NotifyError> {
        let mut first_error: Option<NotifyError> = None;

        if let Some(notice) = plan.email {
            let url = format!("{}{}", self.app_url, notice.link);
            let email = templates::notification(notice.recipients, &notice.message, &url);
            if let Err(e) = self.mailer.send(&email).await {
                tracing::warn!(error = %e, "Notification email failed");
                first_error.get_or_insert(e.into());
            }
        }

        if !plan.records.is_empty() {
            match NotificationRepo::bulk_create(&self.pool, &plan.records).await {
                Ok(written) => tracing::debug!(written, "Notification records created"),
                Err(e) => {
                    tracing::warn!(error = %e, "Notification insert failed");
                    first_error.get_or_insert(e.into());
                }
            }
        }

        for push in &plan.pushes {
            if let Err(e) = self.pusher.trigger(push).await {
                tracing::warn!(error = %e, event = %push.event, "Push failed");
                first_error.get_or_insert(e.into());
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn user(&self, id: DbId) -> Result<User, NotifyError> {
        UserRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(NotifyError::UserNotFound(id))
    }

    async fn article(&self, id: DbId) -> Result<Article, NotifyError> {
        ArticleRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(NotifyError::ArticleNotFound(id))
    }
}
