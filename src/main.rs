//! Room relay server binary
//!
//! Configuration comes from the environment: `PORT` (default 3000),
//! `RELAY_CONFIG` for an optional YAML file, `RUST_LOG` for log filtering.

use relay::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::load()?;

    RelayServerBuilder::new().with_config(config).serve().await
}
