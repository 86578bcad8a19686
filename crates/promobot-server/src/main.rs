mod api;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use promobot_copy::CopyClient;
use promobot_core::ConfigStore;
use promobot_engine::{PromotionJob, Publisher, RobotScheduler};
use promobot_storefront::StorefrontClient;

use crate::api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = promobot_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if config.webhook_url.is_none() {
        tracing::warn!("PROMOBOT_WEBHOOK_URL is not set; promotion runs will be skipped");
    }

    let storefront = Arc::new(StorefrontClient::from_app_config(&config)?);
    let copy = Arc::new(CopyClient::from_app_config(&config)?);
    let publisher = Arc::new(Publisher::from_app_config(&config)?);
    let job = Arc::new(PromotionJob::new(
        Arc::clone(&storefront),
        Arc::clone(&copy),
        Arc::clone(&publisher),
    ));
    let store = Arc::new(ConfigStore::new(config.config_path.clone()));

    let mut scheduler = RobotScheduler::start(Arc::clone(&job)).await?;

    // Re-arm the persisted configuration so a restart does not silently
    // deactivate the robot. A bad document degrades to Idle with a warning.
    if let Some(saved) = store.load() {
        if let Err(e) = scheduler.reconfigure(saved).await {
            tracing::warn!(error = %e, "persisted configuration could not be armed");
        }
    }

    let scheduler = Arc::new(Mutex::new(scheduler));
    let app = api::build_app(AppState {
        scheduler: Arc::clone(&scheduler),
        store,
        job,
        storefront,
        copy,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "promobot server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the background clock on the way out; an in-flight run still
    // completes its batch.
    scheduler.lock().await.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
