//! Gateway entry-point: configuration from the environment, then serve.

use std::env;
use std::net::SocketAddr;

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use backend::server::{ServerConfig, run};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

fn config_from_env() -> std::io::Result<ServerConfig> {
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
        .parse()
        .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR: {err}")))?;

    let upstream_base = env::var("UPSTREAM_BASE_URL")
        .map_err(|_| std::io::Error::other("UPSTREAM_BASE_URL must be set"))?;
    let upstream_base = Url::parse(&upstream_base)
        .map_err(|err| std::io::Error::other(format!("invalid UPSTREAM_BASE_URL: {err}")))?;

    let mut config = ServerConfig::new(bind_addr, upstream_base);
    if let Ok(raw) = env::var("UPSTREAM_TIMEOUT_SECONDS") {
        let seconds: u64 = raw
            .parse()
            .map_err(|err| std::io::Error::other(format!("invalid UPSTREAM_TIMEOUT_SECONDS: {err}")))?;
        config = config.with_upstream_timeout(std::time::Duration::from_secs(seconds));
    }
    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = config_from_env()?;
    run(config).await
}
