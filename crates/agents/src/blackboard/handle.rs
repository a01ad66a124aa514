//! SinkHandle - one blackboard sink behind its own queue and worker task
//!
//! A slow or failing sink only ever loses its own records.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{EventSink, LogRecord};

use super::sink_metrics::SinkMetrics;

pub struct SinkHandle {
    name: String,
    tx: mpsc::Sender<LogRecord>,
    metrics: Arc<SinkMetrics>,
    worker: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker for `sink` with a bounded queue
    pub fn spawn<S: EventSink + Send + 'static>(sink: S, capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker = tokio::spawn(sink_worker(sink, rx, Arc::clone(&metrics), name.clone()));

        Self {
            name,
            tx,
            metrics,
            worker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a record without waiting
    ///
    /// Returns false when the record was dropped.
    pub fn try_send(&self, record: LogRecord) -> bool {
        match self.tx.try_send(record) {
            Ok(()) => {
                self.metrics
                    .set_queued(self.tx.max_capacity() - self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(record)) => {
                self.metrics.inc_dropped();
                metrics::counter!("wildguard_blackboard_dropped_total", "sink" => self.name.clone())
                    .increment(1);
                warn!(sink = %self.name, kind = record.event.kind(), "Sink queue full, record dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker gone");
                false
            }
        }
    }

    /// Close the queue and wait for the worker to drain it
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            error!(sink = %self.name, error = ?e, "Sink worker panicked");
        }
        debug!(sink = %self.name, "Sink stopped");
    }
}

#[instrument(name = "sink_worker_loop", skip(sink, rx, metrics), fields(sink = %name))]
async fn sink_worker<S: EventSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<LogRecord>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    while let Some(record) = rx.recv().await {
        metrics.set_queued(rx.len());
        match sink.write(&record).await {
            Ok(()) => metrics.inc_written(),
            Err(e) => {
                metrics.inc_failed();
                error!(sink = %name, kind = record.event.kind(), error = %e, "Sink write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }
}
