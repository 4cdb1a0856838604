//! Metadata store for file records.
//!
//! `FileStore` is the key-value persistence boundary: `get` by id (absence
//! is a normal outcome) and `put` a whole record. The production backend is
//! Redis; `MemoryFileStore` backs local development and tests.

mod memory;
mod redis_store;
mod store;

pub use memory::MemoryFileStore;
pub use redis_store::RedisFileStore;
pub use store::{FileStore, MetaError, MetaResult};
