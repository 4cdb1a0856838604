use async_trait::async_trait;
use fileway_core::models::FileRecord;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::store::{FileStore, MetaResult};

/// Redis-backed file store.
///
/// Records are stored as JSON under `file:{id}`. The multiplexed
/// `ConnectionManager` reconnects on its own, so a connection-pool layer
/// is not needed here.
#[derive(Clone)]
pub struct RedisFileStore {
    manager: ConnectionManager,
}

impl RedisFileStore {
    pub async fn connect(url: &str) -> MetaResult<Self> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        tracing::info!(url = %url, "Connected to metadata store");
        Ok(RedisFileStore { manager })
    }

    fn key(id: Uuid) -> String {
        format!("file:{}", id)
    }
}

#[async_trait]
impl FileStore for RedisFileStore {
    async fn get(&self, id: Uuid) -> MetaResult<Option<FileRecord>> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn.get(Self::key(id)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, record: &FileRecord) -> MetaResult<()> {
        let mut conn = self.manager.clone();
        let json = serde_json::to_string(record)?;
        let _: () = conn.set(Self::key(record.id), json).await?;
        Ok(())
    }
}
