use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use fileway_core::models::FileRecord;
use uuid::Uuid;

use crate::store::{FileStore, MetaResult};

/// In-memory file store for local development and tests.
#[derive(Default)]
pub struct MemoryFileStore {
    records: RwLock<HashMap<Uuid, FileRecord>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a record. Deliberately not part of `FileStore` - the core has
    /// no delete operation; this exists for dev tooling and tests.
    pub fn remove(&self, id: Uuid) {
        self.records
            .write()
            .expect("file store lock poisoned")
            .remove(&id);
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn get(&self, id: Uuid) -> MetaResult<Option<FileRecord>> {
        let records = self.records.read().expect("file store lock poisoned");
        Ok(records.get(&id).cloned())
    }

    async fn put(&self, record: &FileRecord) -> MetaResult<()> {
        let mut records = self.records.write().expect("file store lock poisoned");
        records.insert(record.id, record.clone());
        Ok(())
    }
}
