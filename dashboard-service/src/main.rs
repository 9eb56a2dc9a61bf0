use anyhow::Result;
use dashboard_service::{config::AppConfig, metrics_server, observability, server};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr);
    }

    // The API only reads the half-hourly table; imports happen out-of-band
    // via the backfill bin.
    let options = SqliteConnectOptions::new()
        .filename(&cfg.database.path)
        .read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!(
        database = %cfg.database.path,
        hotels = cfg.hotels.len(),
        "starting dashboard service"
    );

    server::serve(cfg, pool).await
}
