use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use haven_api::config::ServerConfig;
use haven_api::router::build_app_router;
use haven_api::state::AppState;
use haven_db::repositories::RevokedTokenRepo;
use haven_events::{
    EmailConfig, EventBus, LogMailer, LogPusher, Mailer, NotificationRouter, Notifier, Pusher,
    PusherClient, PusherConfig, SmtpMailer,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired entries are dropped from the token blacklist.
const REVOKED_TOKEN_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "haven_api=debug,haven_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, app_url = %config.app_url, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = haven_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    haven_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    haven_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Transports ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "Using SMTP mailer");
            Arc::new(SmtpMailer::new(email_config).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };
    let pusher: Arc<dyn Pusher> = match PusherConfig::from_env() {
        Some(pusher_config) => {
            tracing::info!(cluster = %pusher_config.cluster, "Using Pusher");
            Arc::new(PusherClient::new(pusher_config))
        }
        None => {
            tracing::warn!("Pusher credentials not set, push events will only be logged");
            Arc::new(LogPusher)
        }
    };

    // --- Event bus + notification router ---
    let event_bus = Arc::new(EventBus::default());
    let notifier = Arc::new(Notifier::new(
        pool.clone(),
        Arc::clone(&mailer),
        pusher,
        config.app_url.clone(),
    ));
    let router_handle = tokio::spawn(NotificationRouter::new(notifier).run(event_bus.subscribe()));

    // --- Token blacklist housekeeping ---
    let purge_cancel = CancellationToken::new();
    let purge_handle = tokio::spawn(purge_revoked_tokens(pool.clone(), purge_cancel.clone()));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        mailer,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    purge_cancel.cancel();
    let _ = purge_handle.await;

    // Dropping the last sender closes the bus; the router then drains
    // in-flight notifications and returns.
    drop(event_bus);
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, router_handle).await.is_err() {
        tracing::warn!(timeout_secs = config.shutdown_timeout_secs, "Notification router did not drain in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Periodically delete blacklist entries whose tokens have expired.
async fn purge_revoked_tokens(pool: haven_db::DbPool, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(REVOKED_TOKEN_PURGE_INTERVAL);
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = interval.tick() => match RevokedTokenRepo::purge_expired(&pool).await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Purged expired revoked tokens"),
                Err(e) => tracing::error!(error = %e, "Failed to purge revoked tokens"),
            },
        }
    }
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
