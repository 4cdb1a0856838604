//! Configuration module
//!
//! Process configuration, read once from the environment at startup and
//! passed explicitly into each component's constructor. No ambient globals.

use std::env;
use std::time::Duration;

const SERVER_PORT: u16 = 8080;
const SAMPLE_INTERVAL_MS: u64 = 100;
const STATUS_POLL_INTERVAL_MS: u64 = 100;
const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;
const RELAY_BUFFER_CHUNKS: usize = 16;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    /// Address of the Redis metadata store
    pub metadata_url: String,
    /// Base URL of the remote blob store
    pub blob_store_url: String,
    /// Period of the relay's progress sampler
    pub sample_interval: Duration,
    /// Period of the status publisher's poll loop
    pub status_poll_interval: Duration,
    /// Request body cap for the transfer endpoint
    pub max_upload_bytes: usize,
    /// Capacity (in chunks) of the bounded producer/consumer hand-off
    pub relay_buffer_chunks: usize,
    /// Optional overall transfer timeout. None = unbounded.
    pub upload_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let blob_store_url = env::var("BLOB_STORE_URL")
            .map_err(|_| anyhow::anyhow!("BLOB_STORE_URL must be set"))?;

        Ok(Config {
            server_port: parse_env("SERVER_PORT", SERVER_PORT)?,
            metadata_url: env::var("METADATA_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            blob_store_url,
            sample_interval: Duration::from_millis(parse_env(
                "SAMPLE_INTERVAL_MS",
                SAMPLE_INTERVAL_MS,
            )?),
            status_poll_interval: Duration::from_millis(parse_env(
                "STATUS_POLL_INTERVAL_MS",
                STATUS_POLL_INTERVAL_MS,
            )?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", MAX_UPLOAD_BYTES)?,
            relay_buffer_chunks: parse_env("RELAY_BUFFER_CHUNKS", RELAY_BUFFER_CHUNKS)?,
            upload_timeout: match env::var("UPLOAD_TIMEOUT_SECS") {
                Ok(raw) => Some(Duration::from_secs(raw.parse().map_err(|e| {
                    anyhow::anyhow!("Invalid UPLOAD_TIMEOUT_SECS '{}': {}", raw, e)
                })?)),
                Err(_) => None,
            },
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.blob_store_url.is_empty() {
            anyhow::bail!("BLOB_STORE_URL must not be empty");
        }
        if self.relay_buffer_chunks == 0 {
            anyhow::bail!("RELAY_BUFFER_CHUNKS must be at least 1");
        }
        if self.sample_interval.is_zero() || self.status_poll_interval.is_zero() {
            anyhow::bail!("sampler and poll intervals must be non-zero");
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}
