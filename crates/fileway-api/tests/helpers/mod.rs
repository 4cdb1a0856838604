#![allow(dead_code)]

pub mod blob;
pub mod stores;

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use fileway_api::services::relay::RelayConfig;
use fileway_api::setup::routes::build_router;
use fileway_api::state::AppState;
use fileway_core::models::FileRecord;
use fileway_db::FileStore;
use fileway_storage::BlobStore;

/// Short intervals so scenario tests settle quickly.
pub fn relay_config() -> RelayConfig {
    RelayConfig {
        sample_interval: Duration::from_millis(10),
        buffer_chunks: 8,
        timeout: None,
    }
}

pub fn test_state(files: Arc<dyn FileStore>, blobs: Arc<dyn BlobStore>) -> AppState {
    AppState {
        files,
        blobs,
        relay: relay_config(),
        status_poll_interval: Duration::from_millis(20),
    }
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(64 * 1024 * 1024, state)).expect("test server")
}

/// Seed a record the way the create endpoint would: allocate a location,
/// persist with status `init`.
pub async fn seed_record(
    files: &dyn FileStore,
    blobs: &dyn BlobStore,
    name: &str,
) -> FileRecord {
    let url = blobs.allocate(name).await.expect("allocate");
    let record = FileRecord::new(name.to_string(), url);
    files.put(&record).await.expect("seed record");
    record
}
