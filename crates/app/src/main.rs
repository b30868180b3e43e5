//! Curlew binary.
//!
//! Opens the collection database and serves JSON commands on stdin/stdout.

use std::sync::Arc;

use curlew::{AppConfig, CommandHandler, logging, serve};
use curlew_infrastructure::SqliteStore;
use tokio::io::{BufReader, stdin, stdout};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let config = AppConfig::from_env()?;
    let settings = config.settings.load_or_init().await?;
    let store = Arc::new(SqliteStore::open(&config.db_path)?);

    tracing::info!(
        "Starting Curlew v{} with {}",
        env!("CARGO_PKG_VERSION"),
        config.db_path.display()
    );

    let handler = Arc::new(CommandHandler::new(store, &settings));
    serve(handler, BufReader::new(stdin()), stdout()).await?;

    Ok(())
}
