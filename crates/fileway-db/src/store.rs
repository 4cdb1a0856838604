use async_trait::async_trait;
use fileway_core::models::FileRecord;
use fileway_core::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Metadata store operation errors
#[derive(Debug, Error)]
pub enum MetaError {
    #[error("Metadata backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type MetaResult<T> = Result<T, MetaError>;

impl From<MetaError> for AppError {
    fn from(err: MetaError) -> Self {
        AppError::Meta(err.to_string())
    }
}

/// Key-value persistence for file records, addressed by id.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Fetch a record. A missing id is `Ok(None)`, not an error.
    async fn get(&self, id: Uuid) -> MetaResult<Option<FileRecord>>;

    /// Persist a record under its id, overwriting any previous version.
    async fn put(&self, record: &FileRecord) -> MetaResult<()>;
}
