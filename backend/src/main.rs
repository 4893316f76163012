mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod notifications;
mod routes;
mod schema;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::AuthConfig;
use crate::config::AppConfig;
use crate::notifications::{
    start_reminder_task, NotificationService, PgNotificationStore, WebPushSender,
};
use crate::routes::{build_cors_layer, build_router};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canteen_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!(
        "Starting canteen backend (timezone {}, cutoff {})",
        config.cutoff.timezone,
        config.cutoff.display_cutoff()
    );

    let pool = db::establish_connection_pool(&config)?;
    tracing::info!("Database connection pool initialized");

    let notifications = Arc::new(NotificationService::new(
        Arc::new(PgNotificationStore::new(pool.clone())),
        Arc::new(WebPushSender::new(&config.push)),
        config.cutoff,
        config.push.max_concurrency,
    ));

    if config.reminder_scheduler_enabled {
        let service = notifications.clone();
        let at = config.reminder_time;
        tokio::spawn(async move {
            start_reminder_task(service, at).await;
        });
    } else {
        tracing::info!("Reminder scheduler disabled");
    }

    let state = AppState {
        pool,
        auth: AuthConfig::from_app_config(&config),
        config: config.clone(),
        notifications,
    };
    let app = build_router(state, build_cors_layer(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
