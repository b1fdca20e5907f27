//! Realtime push via the Pusher Channels REST API.
//!
//! [`PusherClient`] signs each trigger request with HMAC-SHA256 over the
//! method, path and sorted query string, as the Channels HTTP API requires.
//! When any credential is missing, [`PusherConfig::from_env`] returns `None`
//! and the server falls back to [`LogPusher`].

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha2::{Digest, Sha256};

use super::{DeliveryError, PushEvent, Pusher};

type HmacSha256 = Hmac<Sha256>;

/// HTTP request timeout for a single trigger.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Signature scheme version sent as `auth_version`.
const AUTH_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// PusherConfig
// ---------------------------------------------------------------------------

/// Credentials for a Pusher Channels app.
#[derive(Debug, Clone)]
pub struct PusherConfig {
    pub app_id: String,
    pub key: String,
    pub secret: String,
    /// Cluster name, e.g. `eu` or `mt1`.
    pub cluster: String,
}

impl PusherConfig {
    /// Load `PUSHER_APP_ID`, `PUSHER_KEY`, `PUSHER_SECRET` and
    /// `PUSHER_CLUSTER`. Returns `None` if any is unset.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            app_id: std::env::var("PUSHER_APP_ID").ok()?,
            key: std::env::var("PUSHER_KEY").ok()?,
            secret: std::env::var("PUSHER_SECRET").ok()?,
            cluster: std::env::var("PUSHER_CLUSTER").ok()?,
        })
    }

    fn events_path(&self) -> String {
        format!("/apps/{}/events", self.app_id)
    }

    fn host(&self) -> String {
        format!("api-{}.pusher.com", self.cluster)
    }
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Hex MD5 of the request body, sent as `body_md5`.
pub fn body_md5(body: &str) -> String {
    format!("{:x}", Md5::digest(body.as_bytes()))
}

/// Build the signed query string for a `POST` to `path`.
///
/// Parameters are emitted in key order; the signature covers
/// `"POST\n{path}\n{query}"`.
pub fn signed_query(config: &PusherConfig, path: &str, body: &str, timestamp: i64) -> String {
    let query = format!(
        "auth_key={}&auth_timestamp={}&auth_version={}&body_md5={}",
        config.key,
        timestamp,
        AUTH_VERSION,
        body_md5(body)
    );
    let to_sign = format!("POST\n{path}\n{query}");

    let mut mac = HmacSha256::new_from_slice(config.secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(to_sign.as_bytes());
    let signature = format!("{:x}", mac.finalize().into_bytes());

    format!("{query}&auth_signature={signature}")
}

// ---------------------------------------------------------------------------
// PusherClient
// ---------------------------------------------------------------------------

/// Triggers events through the Pusher REST API.
pub struct PusherClient {
    config: PusherConfig,
    client: reqwest::Client,
}

impl PusherClient {
    pub fn new(config: PusherConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl Pusher for PusherClient {
    async fn trigger(&self, push: &PushEvent) -> Result<(), DeliveryError> {
        let body = serde_json::json!({
            "name": push.event,
            "channels": [push.channel],
            "data": push.data,
        })
        .to_string();

        let path = self.config.events_path();
        let query = signed_query(&self.config, &path, &body, chrono::Utc::now().timestamp());
        let url = format!("https://{}{path}?{query}", self.config.host());

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }

        tracing::debug!(channel = %push.channel, event = %push.event, "Push triggered");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LogPusher
// ---------------------------------------------------------------------------

/// Development pusher: logs the event instead of triggering it.
#[derive(Debug, Default)]
pub struct LogPusher;

#[async_trait]
impl Pusher for LogPusher {
    async fn trigger(&self, push: &PushEvent) -> Result<(), DeliveryError> {
        tracing::info!(
            channel = %push.channel,
            event = %push.event,
            "Pusher not configured, push logged instead of triggered"
        );
        Ok(())
    }
}
