//! AdBridge server binary

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adbridge::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxApplicationRepository, SqlxCampaignRepository, SqlxNotificationRepository,
            SqlxSessionRepository, SqlxUserRepository, SqlxVideoRepository,
        },
    },
    services::{
        ApplicationService, AuthService, CampaignService, NotificationService, VideoService,
    },
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "adbridge=info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("Starting AdBridge...");

    let config = Config::load_with_env(Path::new("config.yml"))?;

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Connected to {:?} database", config.database.driver);

    db::migrations::run_migrations(&pool).await?;

    // One repository per table, all sharing the pool
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let campaign_repo = SqlxCampaignRepository::boxed(pool.clone());
    let application_repo = SqlxApplicationRepository::boxed(pool.clone());
    let video_repo = SqlxVideoRepository::boxed(pool.clone());
    let notification_repo = SqlxNotificationRepository::boxed(pool.clone());

    let auth_service = Arc::new(AuthService::new(user_repo, session_repo));
    let campaign_service = Arc::new(CampaignService::new(campaign_repo.clone()));
    let notification_service = Arc::new(NotificationService::new(notification_repo));
    let application_service = Arc::new(ApplicationService::new(
        application_repo.clone(),
        campaign_repo.clone(),
        notification_service.clone(),
    ));
    let video_service = Arc::new(VideoService::new(
        video_repo,
        application_repo,
        campaign_repo,
        notification_service.clone(),
    ));

    let state = AppState {
        auth_service,
        campaign_service,
        application_service,
        video_service,
        notification_service,
    };
    let app = api::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            // Resolving this future stops the server, so hang instead.
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
