//! In-process blob store double with configurable outcome.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use fileway_storage::{BlobError, BlobResult, BlobStore, ByteStream};
use futures::StreamExt;

pub struct MockBlobStore {
    reject: Option<(u16, String)>,
    received: Mutex<HashMap<String, Vec<u8>>>,
    next: AtomicU64,
}

impl MockBlobStore {
    /// A store that accepts every write.
    pub fn accepting() -> Arc<Self> {
        Arc::new(MockBlobStore {
            reject: None,
            received: Mutex::new(HashMap::new()),
            next: AtomicU64::new(0),
        })
    }

    /// A store that rejects every write with the given status and body.
    pub fn rejecting(status: u16, body: &str) -> Arc<Self> {
        Arc::new(MockBlobStore {
            reject: Some((status, body.to_string())),
            received: Mutex::new(HashMap::new()),
            next: AtomicU64::new(0),
        })
    }

    pub fn received(&self, location: &str) -> Option<Vec<u8>> {
        self.received.lock().unwrap().get(location).cloned()
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn allocate(&self, name: &str) -> BlobResult<String> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        Ok(format!("blob://test/{}/{}", n, name))
    }

    async fn store(&self, location: &str, mut body: ByteStream) -> BlobResult<()> {
        if let Some((status, reject_body)) = &self.reject {
            return Err(BlobError::Rejected {
                status: *status,
                body: reject_body.clone(),
            });
        }

        let mut buf = Vec::new();
        while let Some(chunk) = body.next().await {
            let bytes = chunk.map_err(|e| BlobError::Rejected {
                status: 500,
                body: e.to_string(),
            })?;
            buf.extend_from_slice(&bytes);
        }
        self.received
            .lock()
            .unwrap()
            .insert(location.to_string(), buf);
        Ok(())
    }

    async fn fetch(&self, location: &str) -> BlobResult<ByteStream> {
        let bytes = self
            .received(location)
            .ok_or_else(|| BlobError::NotFound(location.to_string()))?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok(Bytes::from(bytes))
        })))
    }
}
