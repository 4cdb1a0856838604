//! Status publisher
//!
//! One polling loop per subscriber, sourced by periodic re-reads of the
//! metadata store, until the record reaches a terminal state or the
//! subscriber disconnects (dropping the stream ends the loop).

use std::sync::Arc;
use std::time::Duration;

use fileway_core::models::{FileRecord, StatusFrame};
use fileway_db::FileStore;
use futures::Stream;
use tokio::time::MissedTickBehavior;

/// Live frame sequence for one record, starting from an already-fetched
/// snapshot (the caller handles the record-missing case up front).
///
/// Emits `name` first; a terminal record then gets exactly one `done` frame
/// with no polling at all. Otherwise each poll yields `progress`, `error`
/// (fetch failed or record gone; the loop keeps polling in both cases, as
/// the record may reappear), or a final `done`.
pub fn subscribe(
    files: Arc<dyn FileStore>,
    record: FileRecord,
    poll_interval: Duration,
) -> impl Stream<Item = StatusFrame> {
    async_stream::stream! {
        yield StatusFrame::Name(record.name.clone());

        if record.status.is_terminal() {
            yield StatusFrame::Done(record.status);
            return;
        }

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match files.get(record.id).await {
                Err(err) => yield StatusFrame::Error(err.to_string()),
                Ok(None) => yield StatusFrame::Error("not found".to_string()),
                Ok(Some(current)) if current.status.is_terminal() => {
                    yield StatusFrame::Done(current.status);
                    break;
                }
                Ok(Some(current)) => yield StatusFrame::Progress(current.progress),
            }
        }
    }
}
