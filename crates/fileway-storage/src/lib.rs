//! Blob-store client.
//!
//! The blob store is an opaque remote service with two operations: allocate
//! a write location, and accept a byte stream at a location. `BlobStore` is
//! the trait boundary; `HttpBlobStore` talks to a remote service over HTTP
//! with fully streamed bodies.

mod http;
mod traits;

pub use http::HttpBlobStore;
pub use traits::{BlobError, BlobResult, BlobStore, ByteStream};
