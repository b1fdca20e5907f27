//! HTTP tests for articles: drafts and publishing, ownership, likes and
//! ratings.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{
    body_json, create_admin, create_article, create_user, delete_auth, get, get_auth, login,
    post_json_auth, put_json_auth,
};
use haven_core::notify::{ArticleAction, NotificationEvent};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn publishing_on_create_emits_event(pool: PgPool) {
    let author = create_user(&pool, "author").await;
    let app = common::build_test_app(pool);
    let token = login(&app.router, "author@example.com").await;
    let mut events = app.event_bus.subscribe();

    let slug = create_article(&app.router, &token, "My First Post", true).await;

    assert!(slug.starts_with("my-first-post-"));
    let published = events.try_recv().expect("publish event");
    assert_matches!(
        published.event,
        NotificationEvent::Publish { sender_id, .. } if sender_id == author.id
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn drafts_are_visible_only_to_their_author(pool: PgPool) {
    create_user(&pool, "author").await;
    create_user(&pool, "reader").await;
    let app = common::build_test_app(pool);
    let author = login(&app.router, "author@example.com").await;
    let reader = login(&app.router, "reader@example.com").await;
    let mut events = app.event_bus.subscribe();

    let slug = create_article(&app.router, &author, "Work in progress", false).await;
    assert!(events.try_recv().is_err(), "drafts do not notify");

    let uri = format!("/api/v1/articles/{slug}");
    assert_eq!(get(app.router.clone(), &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        get_auth(app.router.clone(), &uri, &reader).await.status(),
        StatusCode::NOT_FOUND
    );

    let response = get_auth(app.router.clone(), &uri, &author).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["article"]["published"], false);
    assert_eq!(json["article"]["author_username"], "author");

    let response = get(app.router, "/api/v1/articles").await;
    assert_eq!(body_json(response).await["articles_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn publishing_a_draft_emits_event_once(pool: PgPool) {
    create_user(&pool, "author").await;
    let app = common::build_test_app(pool);
    let token = login(&app.router, "author@example.com").await;
    let slug = create_article(&app.router, &token, "Draft", false).await;
    let mut events = app.event_bus.subscribe();
    let uri = format!("/api/v1/articles/{slug}");

    let response =
        put_json_auth(app.router.clone(), &uri, json!({ "publish": true }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["article"]["published"], true);
    assert_matches!(events.try_recv().unwrap().event, NotificationEvent::Publish { .. });

    // Already published: editing again is silent.
    let response =
        put_json_auth(app.router, &uri, json!({ "title": "Final title" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(events.try_recv().is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_author_edits_and_admins_may_delete(pool: PgPool) {
    create_user(&pool, "author").await;
    create_user(&pool, "other").await;
    create_admin(&pool, "admin").await;
    let app = common::build_test_app(pool);
    let author = login(&app.router, "author@example.com").await;
    let other = login(&app.router, "other@example.com").await;
    let admin = login(&app.router, "admin@example.com").await;
    let slug = create_article(&app.router, &author, "Owned", true).await;
    let uri = format!("/api/v1/articles/{slug}");

    let response =
        put_json_auth(app.router.clone(), &uri, json!({ "title": "Hijacked" }), &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.router.clone(), &uri, &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.router.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(get(app.router, &uri).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn liking_twice_removes_the_like(pool: PgPool) {
    let author = create_user(&pool, "author").await;
    let reader = create_user(&pool, "reader").await;
    let app = common::build_test_app(pool);
    let author_token = login(&app.router, "author@example.com").await;
    let reader_token = login(&app.router, "reader@example.com").await;
    let slug = create_article(&app.router, &author_token, "Likeable", true).await;
    let mut events = app.event_bus.subscribe();
    let uri = format!("/api/v1/articles/vote/{slug}");

    let response =
        post_json_auth(app.router.clone(), &uri, json!({ "status": "true" }), &reader_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "You like this article");
    assert_eq!((json["upvotes"].as_i64(), json["downvotes"].as_i64()), (Some(1), Some(0)));

    let liked = events.try_recv().expect("like event");
    assert_matches!(
        liked.event,
        NotificationEvent::Reaction { sender_id, action: ArticleAction::Like, .. }
            if sender_id == reader.id && sender_id != author.id
    );

    let response =
        post_json_auth(app.router, &uri, json!({ "status": "true" }), &reader_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "You have unvoted this article");
    assert_eq!(json["upvotes"], 0);
    assert!(events.try_recv().is_err(), "removing a like does not notify");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ratings_average_across_readers(pool: PgPool) {
    create_user(&pool, "author").await;
    create_user(&pool, "first").await;
    create_user(&pool, "second").await;
    let app = common::build_test_app(pool);
    let author = login(&app.router, "author@example.com").await;
    let first = login(&app.router, "first@example.com").await;
    let second = login(&app.router, "second@example.com").await;
    let slug = create_article(&app.router, &author, "Rated", true).await;
    let uri = format!("/api/v1/articles/{slug}/rate");

    let response = post_json_auth(app.router.clone(), &uri, json!({ "rate": 6 }), &first).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    post_json_auth(app.router.clone(), &uri, json!({ "rate": 1 }), &first).await;
    post_json_auth(app.router.clone(), &uri, json!({ "rate": 4 }), &first).await;
    let response = post_json_auth(app.router.clone(), &uri, json!({ "rate": 2 }), &second).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["average_rating"], 3.0);
    assert_eq!(json["ratings_count"], 2);

    let response = get(app.router, &format!("/api/v1/articles/{slug}")).await;
    assert_eq!(body_json(response).await["article"]["average_rating"], 3.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_filters_by_category(pool: PgPool) {
    create_user(&pool, "author").await;
    create_admin(&pool, "admin").await;
    let app = common::build_test_app(pool);
    let author = login(&app.router, "author@example.com").await;
    let admin = login(&app.router, "admin@example.com").await;

    let response = post_json_auth(
        app.router.clone(),
        "/api/v1/categories",
        json!({ "name": "Rust", "description": "Systems programming" }),
        &admin,
    )
    .await;
    let category_id = body_json(response).await["category"]["id"].as_i64().unwrap();

    create_article(&app.router, &author, "Uncategorised", true).await;
    let response = post_json_auth(
        app.router.clone(),
        "/api/v1/articles",
        json!({
            "title": "Ownership explained",
            "description": "Borrowing",
            "body": "Body",
            "category_id": category_id,
            "publish": true,
        }),
        &author,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(app.router.clone(), &format!("/api/v1/articles?category={category_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["articles_count"], 1);
    assert_eq!(json["articles"][0]["title"], "Ownership explained");

    let response = get(app.router, "/api/v1/articles").await;
    assert_eq!(body_json(response).await["articles_count"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_category_is_404(pool: PgPool) {
    create_user(&pool, "author").await;
    let app = common::build_test_app(pool);
    let token = login(&app.router, "author@example.com").await;

    let response = post_json_auth(
        app.router,
        "/api/v1/articles",
        json!({
            "title": "Lost",
            "description": "d",
            "body": "b",
            "category_id": 9999,
        }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Category does not exist");
}
