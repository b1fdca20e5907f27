//! Repository for the `articles` table.

use haven_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::{Article, ArticleDetail, CreateArticle, UpdateArticle};

const COLUMNS: &str = "id, title, description, slug, body, image, author_id, category_id, \
                       published, created_at, updated_at";

/// Article joined with its author plus vote and rating aggregates.
const DETAIL_SELECT: &str = "\
    SELECT a.id, a.title, a.description, a.slug, a.body, a.image, a.category_id, \
           a.published, a.created_at, a.updated_at, \
           u.id AS author_id, u.username AS author_username, \
           u.first_name AS author_first_name, u.last_name AS author_last_name, \
           u.image AS author_image, \
           (SELECT COUNT(*) FROM article_votes v WHERE v.article_id = a.id AND v.status) AS likes, \
           (SELECT COUNT(*) FROM article_votes v WHERE v.article_id = a.id AND NOT v.status) AS dislikes, \
           (SELECT AVG(r.rate)::DOUBLE PRECISION FROM article_ratings r WHERE r.article_id = a.id) AS average_rating, \
           (SELECT COUNT(*) FROM article_ratings r WHERE r.article_id = a.id) AS ratings_count \
    FROM articles a \
    JOIN users u ON u.id = a.author_id";

/// Provides CRUD operations for articles.
pub struct ArticleRepo;

impl ArticleRepo {
    pub async fn create(pool: &PgPool, input: &CreateArticle) -> Result<Article, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles \
                (author_id, title, description, body, image, category_id, slug, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(input.author_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.body)
            .bind(&input.image)
            .bind(input.category_id)
            .bind(&input.slug)
            .bind(input.published)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE slug = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Article with author and aggregates, regardless of publish state.
    pub async fn find_detail_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<ArticleDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE a.slug = $1");
        sqlx::query_as::<_, ArticleDetail>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Published articles, newest first, optionally restricted to a category.
    pub async fn list_published(
        pool: &PgPool,
        category_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ArticleDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE a.published AND ($1::BIGINT IS NULL OR a.category_id = $1) \
             ORDER BY a.created_at DESC, a.id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ArticleDetail>(&query)
            .bind(category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of published articles, optionally within a category.
    pub async fn count_published(
        pool: &PgPool,
        category_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM articles \
             WHERE published AND ($1::BIGINT IS NULL OR category_id = $1)",
        )
        .bind(category_id)
        .fetch_one(pool)
        .await
    }

    /// Apply a partial update. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateArticle,
    ) -> Result<Option<Article>, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                body = COALESCE($4, body),
                image = COALESCE($5, image),
                category_id = COALESCE($6, category_id),
                published = COALESCE($7, published)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.body)
            .bind(&input.image)
            .bind(input.category_id)
            .bind(input.published)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
