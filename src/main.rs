//! tls-inspect server
//!
//! Issues a fresh self-signed identity, then serves HTTPS and reports the
//! negotiated TLS parameters of each connection back to the client.

use anyhow::{Context, Result};
use tls_inspect::configs::AppConfig;
use tls_inspect::{identity_issuer, webserver};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.level)
        .with_context(|| format!("Invalid log level: {}", config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    identity_issuer::issue(&config.identity.key_path, &config.identity.cert_path)
        .context("Failed to create key and cert files")?;

    webserver::start_webserver(&config)
}
