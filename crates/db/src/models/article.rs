//! Article, article vote and article rating models.

use haven_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `articles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub body: String,
    pub image: Option<String>,
    pub author_id: DbId,
    pub category_id: Option<DbId>,
    pub published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An article joined with its author and aggregate vote/rating state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleDetail {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub body: String,
    pub image: Option<String>,
    pub category_id: Option<DbId>,
    pub published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub author_id: DbId,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_image: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub average_rating: Option<f64>,
    pub ratings_count: i64,
}

/// DTO for inserting an article.
#[derive(Debug)]
pub struct CreateArticle {
    pub author_id: DbId,
    pub title: String,
    pub description: String,
    pub body: String,
    pub image: Option<String>,
    pub category_id: Option<DbId>,
    pub slug: String,
    pub published: bool,
}

/// DTO for a partial article update.
#[derive(Debug, Default)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub category_id: Option<DbId>,
    pub published: Option<bool>,
}

/// A row from the `article_votes` table (`status`: true = like).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleVote {
    pub id: DbId,
    pub article_id: DbId,
    pub user_id: DbId,
    pub status: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `article_ratings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleRating {
    pub id: DbId,
    pub article_id: DbId,
    pub user_id: DbId,
    pub rate: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
