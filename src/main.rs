use anyhow::Result;
use tracing::info;

use es_health_exporter::{load_config, serve};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config()?;
    info!(
        "exporting {} on {}",
        cfg.upstream.health_url, cfg.listen_addr
    );

    serve(&cfg).await
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
