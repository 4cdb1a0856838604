use async_trait::async_trait;
use bytes::Bytes;
use fileway_core::AppError;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// A stream of body chunks, as accepted and produced by the blob store.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Blob-store operation errors
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Allocate failed: {0}")]
    AllocateFailed(String),

    /// The store refused the write. Status and body are kept verbatim so
    /// callers can forward them unchanged.
    #[error("Blob store rejected the write with status {status}")]
    Rejected { status: u16, body: String },

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type BlobResult<T> = Result<T, BlobError>;

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::Rejected { status, body } => AppError::Upstream { status, body },
            BlobError::NotFound(loc) => AppError::NotFound(loc),
            other => AppError::Blob(other.to_string()),
        }
    }
}

/// Remote blob storage boundary.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Ask the store for a write location for a new blob. Called once at
    /// record creation; the location is fixed for the record's lifetime.
    async fn allocate(&self, name: &str) -> BlobResult<String>;

    /// Stream a body to a previously allocated location. Neither side
    /// needs the final size up front.
    async fn store(&self, location: &str, body: ByteStream) -> BlobResult<()>;

    /// Stream a stored blob back.
    async fn fetch(&self, location: &str) -> BlobResult<ByteStream>;
}
