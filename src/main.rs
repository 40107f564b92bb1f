use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zedis::config::Config;
use zedis::{shell, store};

#[tokio::main]
async fn main() -> zedis::error::ZedisResult<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_args(&args);

    // RUST_LOG wins over --loglevel when both are given
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.loglevel))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(databases = config.databases, "zedis starting");
    let store = store::shared(config.databases);
    let config = Arc::new(RwLock::new(config));

    let executed = shell::run(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        &store,
        &config,
    )
    .await?;

    info!(executed, "zedis exiting");
    Ok(())
}
