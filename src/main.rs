use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use passkeep::db::{self, PasswordStorage};
use passkeep::router::{PasskeepState, passkeep_router};
use passkeep::{PasswordHasher, PasswordService};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &passkeep::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        bcrypt_cost = cfg.bcrypt_cost,
        api_key = cfg.api_key.is_some()
    );
    if cfg.api_key.is_none() {
        warn!("no api key configured; relying on the gateway for caller authentication");
    }

    let pool = db::connect(&cfg.database_url, cfg.max_connections).await?;
    let storage = PasswordStorage::new(pool.clone());
    storage.init_schema().await?;

    let passwords = PasswordService::new(storage, PasswordHasher::new(cfg.bcrypt_cost));
    let state = PasskeepState::new(passwords, cfg.api_key.as_deref());
    let app = passkeep_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
