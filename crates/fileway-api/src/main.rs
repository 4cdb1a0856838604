use std::sync::Arc;

use anyhow::Context;
use fileway_api::{setup, state::AppState, telemetry};
use fileway_core::Config;
use fileway_db::RedisFileStore;
use fileway_storage::HttpBlobStore;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    config
        .validate()
        .context("Configuration validation failed")?;

    telemetry::init_telemetry();
    tracing::info!("Configuration loaded and validated");

    let files = Arc::new(
        RedisFileStore::connect(&config.metadata_url)
            .await
            .context("Failed to connect to metadata store")?,
    );
    let blobs = Arc::new(HttpBlobStore::new(&config.blob_store_url));

    let state = AppState::new(&config, files, blobs);
    let router = setup::routes::build_router(config.max_upload_bytes, state);

    setup::server::start_server(&config, router).await
}
