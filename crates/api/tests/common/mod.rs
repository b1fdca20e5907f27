#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use haven_api::auth::jwt::JwtConfig;
use haven_api::auth::password::hash_password;
use haven_api::config::ServerConfig;
use haven_api::router::build_app_router;
use haven_api::state::AppState;
use haven_db::models::user::{CreateUser, User};
use haven_db::repositories::UserRepo;
use haven_events::{DeliveryError, EventBus, Mailer, OutgoingEmail};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// Mailer that keeps every message for later inspection.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Test app plus handles to its side channels.
pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub event_bus: Arc<EventBus>,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        app_url: "http://localhost:3000".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_mins: 60,
        },
    }
}

/// Build the production router over `pool` with a recording mailer.
///
/// Nothing drains the event bus; tests that care about published events
/// subscribe to `event_bus` before sending requests.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        mailer: mailer.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        mailer,
        event_bus,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`PASSWORD`] directly.
pub async fn create_user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: Some(hash_password(PASSWORD).expect("hashing should succeed")),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            image: None,
            social: false,
            email_verification_token: None,
        },
    )
    .await
    .expect("user creation should succeed")
}

pub async fn create_admin(pool: &PgPool, username: &str) -> User {
    let user = create_user(pool, username).await;
    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(user.id)
        .execute(pool)
        .await
        .expect("role update should succeed");
    user
}

/// Create an article through the API and return its slug.
pub async fn create_article(app: &Router, token: &str, title: &str, publish: bool) -> String {
    let response = post_json_auth(
        app.clone(),
        "/api/v1/articles",
        serde_json::json!({
            "title": title,
            "description": "A short description",
            "body": "Body text",
            "publish": publish,
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["article"]["slug"]
        .as_str()
        .expect("article must have a slug")
        .to_string()
}

/// Log in through the API and return the bearer token.
pub async fn login(app: &Router, email: &str) -> String {
    let response = post_json(
        app.clone(),
        "/api/v1/users/login",
        serde_json::json!({ "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["user"]["token"]
        .as_str()
        .expect("login response must carry a token")
        .to_string()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, "GET", uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, "POST", uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "POST", uri, Some(token), None).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "PUT", uri, Some(token), None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, "PUT", uri, None, Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "DELETE", uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
