use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port = std::env::var("CORRAL_HTTP_PORT").unwrap_or_else(|_| "8000".to_string());
    let ttl_min = std::env::var("CORRAL_TOKEN_TTL_MIN").unwrap_or_else(|_| "1440".to_string());
    let secret_set = std::env::var("CORRAL_TOKEN_SECRET").is_ok();
    info!(
        target: "corral",
        "corral starting: RUST_LOG='{}', http_port={}, token_ttl_min={}, secret_from_env={}",
        rust_log, http_port, ttl_min, secret_set
    );

    corral::server::run().await
}
