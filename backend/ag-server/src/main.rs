use ag_auth::{AuthServices, LogEmailSender, RequestLimiter, SystemClock};
use ag_config::Config;
use ag_server::{AppState, build_router, logger, settings};

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;
    let config_dir = Config::config_dir()?;

    let log_file = config.log_file_path()?;
    logger::initialize(&config.logging, log_file.as_deref())?;

    info!("Starting ag-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed, /metrics disabled: {}", e);
            None
        }
    };

    let pool = ag_db::connect(&config.database_path()?).await?;
    info!("Migrations complete");

    let auth_settings = settings::auth_settings(&config, &config_dir)?;
    info!("JWT: {} tokens issued as '{}'", auth_settings.algorithm.name(), auth_settings.issuer);
    let services = AuthServices::build(
        pool.clone(),
        &auth_settings,
        Arc::new(SystemClock),
        Arc::new(LogEmailSender),
    )?;

    let request_limiter = Arc::new(RequestLimiter::new(settings::request_limit(&config)));
    let limiter_for_sweep = request_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            limiter_for_sweep.retain_recent();
        }
    });

    let state = AppState {
        pool,
        services,
        request_limiter,
        environment: config.environment,
        trust_proxy_headers: config.server.trust_proxy_headers,
        metrics,
    };
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    })
    .await?;

    info!("Graceful shutdown complete");
    Ok(())
}
