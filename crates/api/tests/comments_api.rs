//! HTTP tests for comments: posting, editing with history, up/down votes
//! and personalised listings.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{
    body_json, create_article, create_user, get, get_auth, login, post_json, post_json_auth,
    put_json_auth,
};
use haven_core::notify::{ArticleAction, NotificationEvent};
use serde_json::json;
use sqlx::PgPool;

/// Author and commenter tokens plus a published article.
struct Fixture {
    app: common::TestApp,
    author: String,
    commenter: String,
    slug: String,
}

async fn fixture(pool: PgPool) -> Fixture {
    create_user(&pool, "author").await;
    create_user(&pool, "commenter").await;
    let app = common::build_test_app(pool);
    let author = login(&app.router, "author@example.com").await;
    let commenter = login(&app.router, "commenter@example.com").await;
    let slug = create_article(&app.router, &author, "Discuss me", true).await;
    Fixture {
        app,
        author,
        commenter,
        slug,
    }
}

async fn post_comment(f: &Fixture, content: &str) -> i64 {
    let response = post_json_auth(
        f.app.router.clone(),
        &format!("/api/v1/articles/{}/comments", f.slug),
        json!({ "content": content }),
        &f.commenter,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["comment"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn comment_accepts_camel_case_highlight_and_notifies(pool: PgPool) {
    let f = fixture(pool).await;
    let mut events = f.app.event_bus.subscribe();

    let response = post_json_auth(
        f.app.router.clone(),
        &format!("/api/v1/articles/{}/comments", f.slug),
        json!({ "content": "Great point", "highlightedText": "the second paragraph" }),
        &f.commenter,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Comment added successfully");
    assert_eq!(json["comment"]["highlighted_text"], "the second paragraph");
    assert_matches!(
        events.try_recv().unwrap().event,
        NotificationEvent::Reaction { action: ArticleAction::Comment, .. }
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn voting_the_same_status_twice_unvotes(pool: PgPool) {
    let f = fixture(pool).await;
    let comment_id = post_comment(&f, "Vote on me").await;
    let uri = format!("/api/v1/comments/vote/{comment_id}");

    let response =
        post_json_auth(f.app.router.clone(), &uri, json!({ "status": "true" }), &f.author).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "You upvote this comment", "upvotes": 1, "downvotes": 0 })
    );

    let response =
        post_json_auth(f.app.router, &uri, json!({ "status": "true" }), &f.author).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "You have unvoted this comment", "upvotes": 0, "downvotes": 0 })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn switching_status_flips_the_vote(pool: PgPool) {
    let f = fixture(pool).await;
    let comment_id = post_comment(&f, "Flip").await;
    let uri = format!("/api/v1/comments/vote/{comment_id}");

    post_json_auth(f.app.router.clone(), &uri, json!({ "status": true }), &f.author).await;
    let response =
        post_json_auth(f.app.router, &uri, json!({ "status": "false" }), &f.author).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "You downvote this comment");
    assert_eq!((json["upvotes"].as_i64(), json["downvotes"].as_i64()), (Some(0), Some(1)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unparseable_status_is_400(pool: PgPool) {
    let f = fixture(pool).await;
    let comment_id = post_comment(&f, "Hmm").await;

    let response = post_json_auth(
        f.app.router,
        &format!("/api/v1/comments/vote/{comment_id}"),
        json!({ "status": "yes" }),
        &f.author,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Wrong status field provided");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn voting_on_missing_comment_is_404(pool: PgPool) {
    let f = fixture(pool).await;

    let response = post_json_auth(
        f.app.router,
        "/api/v1/comments/vote/424242",
        json!({ "status": "true" }),
        &f.author,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Comment does not exist");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn editing_keeps_previous_content_in_history(pool: PgPool) {
    let f = fixture(pool).await;
    let comment_id = post_comment(&f, "First draft").await;
    let uri = format!("/api/v1/articles/{}/comments/{comment_id}", f.slug);

    // Someone else's comment reads as missing.
    let response =
        put_json_auth(f.app.router.clone(), &uri, json!({ "content": "Defaced" }), &f.author).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = put_json_auth(
        f.app.router.clone(),
        &uri,
        json!({ "content": "Second draft" }),
        &f.commenter,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["comment"]["content"], "Second draft");

    let response = get(f.app.router, &format!("{uri}/history")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["comment"]["content"], "Second draft");
    assert_eq!(json["comment_history_count"], 1);
    assert_eq!(json["comment_history"][0]["content"], "First draft");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_includes_the_callers_vote(pool: PgPool) {
    let f = fixture(pool).await;
    let comment_id = post_comment(&f, "Listed").await;
    post_json_auth(
        f.app.router.clone(),
        &format!("/api/v1/comments/vote/{comment_id}"),
        json!({ "status": "false" }),
        &f.author,
    )
    .await;
    let uri = format!("/api/v1/comments/{}", f.slug);

    let response = get_auth(f.app.router.clone(), &uri, &f.author).await;
    let json = body_json(response).await;
    assert_eq!(json["message"], "Comments retrieved successfully");
    assert_eq!(json["comments"][0]["user_vote"], false);
    assert_eq!(json["comments"][0]["downvotes"], 1);
    assert_eq!(json["comments"][0]["author_username"], "commenter");

    let response = get_auth(f.app.router.clone(), &uri, &f.commenter).await;
    assert!(body_json(response).await["comments"][0]["user_vote"].is_null());

    // A bad token reads as anonymous rather than failing the listing.
    let response = get_auth(f.app.router, &uri, "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["comments"][0]["user_vote"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn commenting_requires_a_token(pool: PgPool) {
    let f = fixture(pool).await;

    let response = post_json(
        f.app.router,
        &format!("/api/v1/articles/{}/comments", f.slug),
        json!({ "content": "Anonymous" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn draft_comments_are_hidden_from_everyone_but_the_author(pool: PgPool) {
    let f = fixture(pool).await;
    let draft = create_article(&f.app.router, &f.author, "Work in progress", false).await;
    let comments_uri = format!("/api/v1/articles/{draft}/comments");

    let response = post_json_auth(
        f.app.router.clone(),
        &comments_uri,
        json!({ "content": "found your draft" }),
        &f.commenter,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        f.app.router.clone(),
        &comments_uri,
        json!({ "content": "note to self" }),
        &f.author,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment_id = body_json(response).await["comment"]["id"].as_i64().unwrap();

    let listing = format!("/api/v1/comments/{draft}");
    let response = get(f.app.router.clone(), &listing).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = get_auth(f.app.router.clone(), &listing, &f.commenter).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let history = format!("{comments_uri}/{comment_id}/history");
    let response = get(f.app.router.clone(), &history).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        f.app.router.clone(),
        &format!("/api/v1/comments/vote/{comment_id}"),
        json!({ "status": "true" }),
        &f.commenter,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(f.app.router.clone(), &listing, &f.author).await;
    assert_eq!(response.status(), StatusCode::OK);
    let comments = body_json(response).await["comments"].clone();
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["content"], "note to self");
}
