use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Body, StatusCode};
use serde::{Deserialize, Serialize};

use crate::traits::{BlobError, BlobResult, BlobStore, ByteStream};

/// HTTP client for a remote blob-store service.
///
/// `allocate` POSTs the blob name to `{base}/blobs` and reads back the
/// assigned location; `store` PUTs the body to that location as a streamed
/// (chunked) request.
#[derive(Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct AllocateRequest<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct AllocateResponse {
    url: String,
}

impl HttpBlobStore {
    pub fn new(base_url: &str) -> Self {
        HttpBlobStore {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Locations may come back relative to the service base.
    fn absolute(&self, location: &str) -> String {
        if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            format!("{}/{}", self.base_url, location.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn allocate(&self, name: &str) -> BlobResult<String> {
        let response = self
            .client
            .post(format!("{}/blobs", self.base_url))
            .json(&AllocateRequest { name })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobError::AllocateFailed(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let allocated: AllocateResponse = response
            .json()
            .await
            .map_err(|e| BlobError::AllocateFailed(e.to_string()))?;
        let location = self.absolute(&allocated.url);
        tracing::debug!(name = %name, location = %location, "Allocated blob location");
        Ok(location)
    }

    async fn store(&self, location: &str, body: ByteStream) -> BlobResult<()> {
        let response = self
            .client
            .put(self.absolute(location))
            .body(Body::wrap_stream(body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn fetch(&self, location: &str) -> BlobResult<ByteStream> {
        let response = self.client.get(self.absolute(location)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BlobError::NotFound(location.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::other(e.to_string()));
        Ok(Box::pin(stream))
    }
}
