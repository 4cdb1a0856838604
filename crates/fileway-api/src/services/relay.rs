//! Upload relay
//!
//! Moves bytes from an inbound stream to the blob-store location assigned
//! at record creation, while a background sampler persists progress
//! snapshots. Per transfer attempt the state machine is
//! `Idle -> Receiving -> Relaying -> {Completed, Failed}`: [`UploadRelay::begin`]
//! covers validation and the `uploading` persist, [`RelayJob::run`] the rest.
//!
//! Write serialization: during a transfer the sampler task is the only
//! metadata writer. `run` signals it and awaits its join handle before the
//! terminal write, so a late `uploading` sample can never land over a
//! terminal state.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use fileway_core::models::{FileRecord, FileStatus};
use fileway_core::{AppError, ProgressCounter, ProgressStream};
use fileway_db::FileStore;
use fileway_storage::BlobStore;
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

#[derive(Clone, Copy, Debug)]
pub struct RelayConfig {
    /// Period of the progress sampler.
    pub sample_interval: Duration,
    /// Capacity (in chunks) of the producer/consumer hand-off.
    pub buffer_chunks: usize,
    /// Optional overall transfer timeout.
    pub timeout: Option<Duration>,
}

pub struct UploadRelay {
    files: Arc<dyn FileStore>,
    blobs: Arc<dyn BlobStore>,
    config: RelayConfig,
}

impl UploadRelay {
    pub fn new(files: Arc<dyn FileStore>, blobs: Arc<dyn BlobStore>, config: RelayConfig) -> Self {
        UploadRelay {
            files,
            blobs,
            config,
        }
    }

    /// Validate the transfer request and mark the record `uploading`.
    ///
    /// The record must exist, the declared file name must match it, and its
    /// status must admit a transfer: `init` for the first attempt, `failed`
    /// for a retry. `uploaded` is terminal and read-only, `uploading` means
    /// an attempt is already in flight. None of these failures touches the
    /// record. The `uploading` persist happens before any byte moves and a
    /// failure there aborts the transfer.
    pub async fn begin(self, id: Uuid, filename: &str) -> Result<RelayJob, AppError> {
        let record = self
            .files
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("file {}", id)))?;

        if record.name != filename {
            return Err(AppError::BadRequest(format!(
                "file name '{}' does not match record '{}'",
                filename, record.name
            )));
        }

        match record.status {
            FileStatus::Uploading => {
                return Err(AppError::Conflict(format!(
                    "file {} already has a transfer in flight",
                    id
                )));
            }
            FileStatus::Uploaded => {
                return Err(AppError::Conflict(format!("file {} is already uploaded", id)));
            }
            FileStatus::Init | FileStatus::Failed => {}
        }

        let record = record.with_state(FileStatus::Uploading, 0.0);
        self.files.put(&record).await?;
        tracing::info!(id = %record.id, name = %record.name, "Transfer started");

        Ok(RelayJob {
            files: self.files,
            blobs: self.blobs,
            config: self.config,
            record,
        })
    }
}

/// One validated transfer attempt against a record already marked `uploading`.
pub struct RelayJob {
    files: Arc<dyn FileStore>,
    blobs: Arc<dyn BlobStore>,
    config: RelayConfig,
    record: FileRecord,
}

impl RelayJob {
    pub fn record(&self) -> &FileRecord {
        &self.record
    }

    /// Relay `source` to the record's blob-store location and settle the
    /// record to a terminal state.
    ///
    /// `declared_total` is the inbound request's declared byte count; zero
    /// means unknown, in which case no progress fractions are persisted.
    pub async fn run<S>(self, source: S, declared_total: u64) -> Result<FileRecord, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send + Unpin,
    {
        let counter = ProgressCounter::new(declared_total);
        let mut instrumented = ProgressStream::new(source, counter.clone());

        let (stop_tx, stop_rx) = oneshot::channel();
        let sampler = tokio::spawn(sample_progress(
            self.files.clone(),
            self.record.clone(),
            counter,
            self.config.sample_interval,
            stop_rx,
        ));
        let mut guard = SettleGuard {
            files: self.files.clone(),
            record: self.record.clone(),
            sampler: Some(sampler),
        };

        let outcome = {
            let relay = self.relay_bytes(&mut instrumented);
            match self.config.timeout {
                Some(limit) => match tokio::time::timeout(limit, relay).await {
                    Ok(result) => result,
                    Err(_) => Err(AppError::Internal(format!(
                        "transfer exceeded {}s timeout",
                        limit.as_secs()
                    ))),
                },
                None => relay.await,
            }
        };

        // Terminal writes go out only after the sampler has fully stopped.
        let _ = stop_tx.send(());
        if let Some(sampler) = guard.disarm() {
            let _ = sampler.await;
        }

        match outcome {
            Ok(()) => {
                let done = self.record.with_state(FileStatus::Uploaded, 100.0);
                self.files.put(&done).await?;
                tracing::info!(id = %done.id, "Transfer completed");
                Ok(done)
            }
            Err(err) => {
                // The record must not stay stuck at `uploading`; this
                // persist is itself fatal if it fails.
                let failed = self.record.with_state(FileStatus::Failed, self.record.progress);
                self.files.put(&failed).await?;
                tracing::warn!(id = %failed.id, error = %err, "Transfer failed");
                Err(err)
            }
        }
    }

    /// Bounded producer/consumer hand-off: the producer pulls instrumented
    /// chunks and blocks in `send` while the consumer is not draining, so
    /// memory stays bounded regardless of file size.
    async fn relay_bytes<S>(&self, source: &mut S) -> Result<(), AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send + Unpin,
    {
        let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(self.config.buffer_chunks);

        let blobs = self.blobs.clone();
        let location = self.record.url.clone();
        let consumer =
            tokio::spawn(
                async move { blobs.store(&location, Box::pin(ReceiverStream::new(rx))).await },
            );

        let mut inbound_err = None;
        while let Some(chunk) = source.next().await {
            match chunk {
                Ok(bytes) => {
                    if tx.send(Ok(bytes)).await.is_err() {
                        // Consumer ended early; its result carries the cause.
                        break;
                    }
                }
                Err(err) => {
                    inbound_err = Some(err);
                    break;
                }
            }
        }
        drop(tx);

        if let Some(err) = inbound_err {
            // Inbound source broke mid-stream: abort the outbound transport
            // rather than letting it complete on a truncated body.
            consumer.abort();
            let _ = consumer.await;
            return Err(err);
        }

        consumer
            .await
            .map_err(|e| AppError::Internal(format!("relay consumer task failed: {}", e)))?
            .map_err(AppError::from)
    }
}

/// Settles the record to `failed` if the transfer future is dropped before
/// its terminal write runs (connection-level abort rather than a body read
/// error). Disarmed on both normal outcomes.
///
/// Dropping the future also drops the sampler's stop sender, so the sampler
/// is already winding down; the detached settle task still awaits its join
/// handle first, keeping terminal writes serialized behind the last sample.
struct SettleGuard {
    files: Arc<dyn FileStore>,
    record: FileRecord,
    sampler: Option<tokio::task::JoinHandle<()>>,
}

impl SettleGuard {
    fn disarm(&mut self) -> Option<tokio::task::JoinHandle<()>> {
        self.sampler.take()
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        let Some(sampler) = self.sampler.take() else { return };
        let files = self.files.clone();
        let failed = self.record.with_state(FileStatus::Failed, self.record.progress);
        tokio::spawn(async move {
            let _ = sampler.await;
            match files.put(&failed).await {
                Ok(()) => {
                    tracing::warn!(id = %failed.id, "Transfer cancelled, record settled failed")
                }
                Err(err) => {
                    tracing::error!(id = %failed.id, error = %err, "Cancelled-transfer settle failed")
                }
            }
        });
    }
}

/// Fixed-interval sampler: persists `{uploading, progress}` snapshots while
/// the transfer runs. A persist failure here is non-fatal.
async fn sample_progress(
    files: Arc<dyn FileStore>,
    record: FileRecord,
    counter: Arc<ProgressCounter>,
    period: Duration,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; skip it.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {
                // Unknown total: fraction is undefined, nothing to persist.
                let Some(fraction) = counter.fraction() else { continue };
                let percent = (fraction * 100.0).min(100.0) as f32;
                let snapshot = record.with_state(FileStatus::Uploading, percent);
                if let Err(err) = files.put(&snapshot).await {
                    tracing::warn!(id = %record.id, error = %err, "Progress sample persist failed");
                }
            }
        }
    }
}
