//! Progress-instrumented byte stream
//!
//! A pass-through wrapper over a stream of `Bytes` chunks that counts the
//! bytes flowing through it against a declared total. The wrapper never
//! inspects or buffers chunk content; counting is a pure side channel.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

/// Observer invoked synchronously after each successful non-empty transfer
/// with the updated fraction. Must be non-blocking; it cannot fail the
/// transfer, so any fallible work behind it is the caller's to isolate.
pub type ProgressObserver = Arc<dyn Fn(f64) + Send + Sync>;

/// Shared cumulative byte counter against a declared total.
#[derive(Debug)]
pub struct ProgressCounter {
    transferred: AtomicU64,
    total: u64,
}

impl ProgressCounter {
    pub fn new(total: u64) -> Arc<Self> {
        Arc::new(ProgressCounter {
            transferred: AtomicU64::new(0),
            total,
        })
    }

    pub fn record(&self, n: u64) {
        self.transferred.fetch_add(n, Ordering::Relaxed);
    }

    pub fn transferred(&self) -> u64 {
        self.transferred.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Fraction transferred, `transferred / total`.
    ///
    /// Returns `None` when the total is unknown (zero): the division is
    /// undefined there and callers must handle that case.
    pub fn fraction(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.transferred() as f64 / self.total as f64)
    }
}

/// Stream adapter that records every chunk passing through into a
/// [`ProgressCounter`] and optionally notifies an observer.
pub struct ProgressStream<S> {
    inner: S,
    counter: Arc<ProgressCounter>,
    observer: Option<ProgressObserver>,
}

impl<S> ProgressStream<S> {
    pub fn new(inner: S, counter: Arc<ProgressCounter>) -> Self {
        ProgressStream {
            inner,
            counter,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn counter(&self) -> &Arc<ProgressCounter> {
        &self.counter
    }
}

impl<S, E> Stream for ProgressStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_next(cx);
        if let Poll::Ready(Some(Ok(chunk))) = &polled {
            if !chunk.is_empty() {
                this.counter.record(chunk.len() as u64);
                if let Some(observer) = &this.observer {
                    if let Some(fraction) = this.counter.fraction() {
                        observer(fraction);
                    }
                }
            }
        }
        polled
    }
}
