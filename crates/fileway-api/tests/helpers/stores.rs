//! File-store doubles: write logging and fault injection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fileway_core::models::{FileRecord, FileStatus};
use fileway_db::{FileStore, MemoryFileStore, MetaError, MetaResult};
use uuid::Uuid;

fn injected_failure() -> MetaError {
    MetaError::Backend(redis::RedisError::from(std::io::Error::other(
        "injected failure",
    )))
}

/// Wraps `MemoryFileStore`, logs every successful put, and can be told to
/// fail reads, all writes, or just sampler writes (puts with status
/// `uploading`).
pub struct RecordingStore {
    inner: MemoryFileStore,
    log: Mutex<Vec<FileRecord>>,
    fail_gets: AtomicBool,
    fail_puts: AtomicBool,
    fail_uploading_puts: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingStore {
            inner: MemoryFileStore::new(),
            log: Mutex::new(Vec::new()),
            fail_gets: AtomicBool::new(false),
            fail_puts: AtomicBool::new(false),
            fail_uploading_puts: AtomicBool::new(false),
        })
    }

    pub fn set_fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_uploading_puts(&self, fail: bool) {
        self.fail_uploading_puts.store(fail, Ordering::SeqCst);
    }

    pub fn remove(&self, id: Uuid) {
        self.inner.remove(id);
    }

    /// Snapshot of every record version persisted so far, in write order.
    pub fn writes(&self) -> Vec<FileRecord> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStore for RecordingStore {
    async fn get(&self, id: Uuid) -> MetaResult<Option<FileRecord>> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        self.inner.get(id).await
    }

    async fn put(&self, record: &FileRecord) -> MetaResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        if record.status == FileStatus::Uploading && self.fail_uploading_puts.load(Ordering::SeqCst)
        {
            return Err(injected_failure());
        }
        self.log.lock().unwrap().push(record.clone());
        self.inner.put(record).await
    }
}
