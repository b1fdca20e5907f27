//! Handlers for the `/articles` resource, including likes/dislikes and
//! star ratings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use haven_core::error::CoreError;
use haven_core::notify::{ArticleAction, NotificationEvent};
use haven_core::slug::article_slug;
use haven_core::types::DbId;
use haven_core::voting::VoteTarget;
use haven_db::models::article::{Article, CreateArticle, UpdateArticle};
use haven_db::repositories::{ArticleRatingRepo, ArticleRepo, ArticleVoteRepo, CategoryRepo};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::votes::{vote_response, vote_status, VoteResponse};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::middleware::rbac::is_owner_or_admin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /articles`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub publish: bool,
}

/// Request body for `PUT /articles/{slug}`. The slug never changes.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: Option<String>,
    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
    pub category_id: Option<DbId>,
    pub publish: Option<bool>,
}

/// Request body for `POST /articles/{slug}/rate`.
#[derive(Debug, Deserialize, Validate)]
pub struct RateRequest {
    #[validate(range(min = 1, max = 5, message = "Rate must be between 1 and 5"))]
    pub rate: i16,
}

/// Query for `GET /articles`.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub category: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Published articles are visible to everybody, drafts only to their author.
pub(crate) fn is_visible_to(article: &Article, viewer: Option<DbId>) -> bool {
    article.published || viewer == Some(article.author_id)
}

/// Load an article the caller may see; anything else reads as missing.
pub(crate) async fn load_visible(
    state: &AppState,
    slug: &str,
    viewer: Option<DbId>,
) -> AppResult<Article> {
    ArticleRepo::find_by_slug(&state.pool, slug)
        .await?
        .filter(|a| is_visible_to(a, viewer))
        .ok_or(AppError::Core(CoreError::NotFound("Article")))
}

async fn ensure_category(state: &AppState, category_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = category_id {
        CategoryRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound("Category")))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/articles
pub async fn create_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateArticleRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    input.validate()?;
    ensure_category(&state, input.category_id).await?;

    let article = ArticleRepo::create(
        &state.pool,
        &CreateArticle {
            author_id: auth.user_id,
            slug: article_slug(&input.title),
            title: input.title,
            description: input.description,
            body: input.body,
            image: input.image,
            category_id: input.category_id,
            published: input.publish,
        },
    )
    .await?;

    tracing::info!(article_id = article.id, slug = %article.slug, published = article.published, "Article created");

    if article.published {
        state
            .event_bus
            .publish(NotificationEvent::publish(auth.user_id, article.id));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Article created successfully",
            "article": article,
        })),
    ))
}

/// GET /api/v1/articles?limit=&offset=&category=
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ArticleListParams>,
) -> AppResult<Json<serde_json::Value>> {
    let (limit, offset) = haven_core::pagination::page_window(params.limit, params.offset);
    let articles = ArticleRepo::list_published(&state.pool, params.category, limit, offset).await?;
    let count = ArticleRepo::count_published(&state.pool, params.category).await?;
    Ok(Json(json!({
        "articles": articles,
        "articles_count": count,
    })))
}

/// GET /api/v1/articles/{slug}
pub async fn get_article(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let article = ArticleRepo::find_detail_by_slug(&state.pool, &slug)
        .await?
        .filter(|a| a.published || viewer.user_id() == Some(a.author_id))
        .ok_or(AppError::Core(CoreError::NotFound("Article")))?;
    Ok(Json(json!({ "article": article })))
}

/// PUT /api/v1/articles/{slug}
///
/// Author only. Publishing a draft notifies opted-in readers.
pub async fn update_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateArticleRequest>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;

    let existing = load_visible(&state, &slug, Some(auth.user_id)).await?;
    if existing.author_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only edit your own articles".into(),
        )));
    }
    ensure_category(&state, input.category_id).await?;

    let update = UpdateArticle {
        title: input.title,
        description: input.description,
        body: input.body,
        image: input.image,
        category_id: input.category_id,
        published: input.publish,
    };
    let article = ArticleRepo::update(&state.pool, existing.id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("Article")))?;

    if !existing.published && article.published {
        tracing::info!(article_id = article.id, "Article published");
        state
            .event_bus
            .publish(NotificationEvent::publish(auth.user_id, article.id));
    }

    Ok(Json(json!({
        "message": "Article updated successfully",
        "article": article,
    })))
}

/// DELETE /api/v1/articles/{slug}
///
/// The author or an admin.
pub async fn delete_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    let article = ArticleRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("Article")))?;

    if !is_owner_or_admin(&auth, article.author_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only delete your own articles".into(),
        )));
    }

    ArticleRepo::delete(&state.pool, article.id).await?;
    tracing::info!(article_id = article.id, deleted_by = auth.user_id, "Article deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reactions
// ---------------------------------------------------------------------------

/// POST /api/v1/articles/vote/{slug}
///
/// `status: true` likes, `false` dislikes; repeating the stored status
/// removes the vote. A resulting like or dislike notifies the author.
pub async fn vote_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<VoteResponse>)> {
    let incoming = vote_status(&body)?;
    let article = load_visible(&state, &slug, Some(auth.user_id)).await?;

    let transition = ArticleVoteRepo::toggle(&state.pool, article.id, auth.user_id, incoming).await?;
    let tally = ArticleVoteRepo::tally(&state.pool, article.id).await?;

    let action = match transition.resulting_status() {
        Some(true) => Some(ArticleAction::Like),
        Some(false) => Some(ArticleAction::Dislike),
        None => None,
    };
    if let Some(action) = action {
        state
            .event_bus
            .publish(NotificationEvent::reaction(auth.user_id, article.id, action));
    }

    Ok(vote_response(transition, tally, VoteTarget::Article))
}

/// POST /api/v1/articles/{slug}/rate
///
/// One rating per reader; rating again replaces the previous value.
pub async fn rate_article(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<RateRequest>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;
    let article = load_visible(&state, &slug, Some(auth.user_id)).await?;

    let rating = ArticleRatingRepo::upsert(&state.pool, article.id, auth.user_id, input.rate).await?;
    let (average_rating, ratings_count) = ArticleRatingRepo::summary(&state.pool, article.id).await?;

    Ok(Json(json!({
        "message": "Article rated successfully",
        "rating": rating,
        "average_rating": average_rating,
        "ratings_count": ratings_count,
    })))
}
