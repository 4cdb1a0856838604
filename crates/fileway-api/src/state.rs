//! Application state shared by all handlers.

use std::sync::Arc;
use std::time::Duration;

use fileway_core::Config;
use fileway_db::FileStore;
use fileway_storage::BlobStore;

use crate::services::relay::RelayConfig;

#[derive(Clone)]
pub struct AppState {
    pub files: Arc<dyn FileStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub relay: RelayConfig,
    pub status_poll_interval: Duration,
}

impl AppState {
    pub fn new(config: &Config, files: Arc<dyn FileStore>, blobs: Arc<dyn BlobStore>) -> Self {
        AppState {
            files,
            blobs,
            relay: RelayConfig {
                sample_interval: config.sample_interval,
                buffer_chunks: config.relay_buffer_chunks,
                timeout: config.upload_timeout,
            },
            status_poll_interval: config.status_poll_interval,
        }
    }
}

#[allow(dead_code)]
fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
