//! Buffered dual-sink writer
//!
//! Encoded records are pushed onto a bounded queue and drained by exactly one
//! background worker, which writes each record to the console first and then
//! to the rotating file sink. Producers never observe downstream I/O results;
//! they only wait when the queue is at capacity.

use crate::sink::RotatingFileSink;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

/// Counters for faults the write path deliberately never surfaces.
///
/// Intended for an external monitoring collaborator; all counters are
/// monotonic and relaxed.
#[derive(Debug, Default)]
pub struct SinkStats {
    console_errors: AtomicU64,
    file_errors: AtomicU64,
    dropped_records: AtomicU64,
}

impl SinkStats {
    /// Failed writes or flushes on the console sink
    pub fn console_errors(&self) -> u64 {
        self.console_errors.load(Ordering::Relaxed)
    }

    /// Failed writes or flushes on the rotating file sink
    pub fn file_errors(&self) -> u64 {
        self.file_errors.load(Ordering::Relaxed)
    }

    /// Records discarded because the writer was already shut down
    pub fn dropped_records(&self) -> u64 {
        self.dropped_records.load(Ordering::Relaxed)
    }
}

enum Command {
    Record(Bytes),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Fixed-capacity asynchronous writer fanning records out to two sinks.
///
/// [`write`](TeeWriter::write) is fire-and-forget: it reports the full buffer
/// length and no error regardless of what later happens inside the worker.
/// Records from a single producer reach the sinks in the order they were
/// written; across producers the order is whatever interleaving the queue
/// admits.
pub struct TeeWriter {
    tx: mpsc::Sender<Command>,
    stats: Arc<SinkStats>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TeeWriter {
    /// Create a writer draining to the process standard output and, when
    /// given, a rotating file sink. `capacity` bounds the record queue and
    /// must be at least 1.
    ///
    /// Must be called from within a tokio runtime; the worker task is
    /// spawned immediately.
    pub fn new(capacity: usize, file: Option<RotatingFileSink>) -> Self {
        Self::with_console(capacity, tokio::io::stdout(), file)
    }

    /// Create a writer draining to an arbitrary console sink instead of
    /// standard output. Useful for tests and embedders capturing output.
    pub fn with_console<W>(capacity: usize, console: W, file: Option<RotatingFileSink>) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity);
        let stats = Arc::new(SinkStats::default());
        let worker = tokio::spawn(run_worker(rx, console, file, Arc::clone(&stats)));

        Self {
            tx,
            stats,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue one encoded record.
    ///
    /// Returns the full length of `buf` unconditionally. Suspends only while
    /// the queue is at capacity. After [`shutdown`](TeeWriter::shutdown) the
    /// record is discarded and counted in
    /// [`SinkStats::dropped_records`].
    pub async fn write(&self, buf: Bytes) -> usize {
        let len = buf.len();
        if self.tx.send(Command::Record(buf)).await.is_err() {
            self.stats.dropped_records.fetch_add(1, Ordering::Relaxed);
        }
        len
    }

    /// Wait until every record enqueued before this call has been written
    /// and both sinks are flushed.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }

    /// Drain all buffered records, flush both sinks and stop the worker.
    ///
    /// Safe to call more than once; later calls return immediately.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack)).await.is_ok() {
            let _ = done.await;
        }
        if let Some(handle) = self.worker.lock().await.take() {
            let _ = handle.await;
        }
    }

    /// Fault counters for this writer
    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }
}

async fn run_worker<W>(
    mut rx: mpsc::Receiver<Command>,
    mut console: W,
    mut file: Option<RotatingFileSink>,
    stats: Arc<SinkStats>,
) where
    W: AsyncWrite + Send + Unpin + 'static,
{
    while let Some(cmd) = rx.recv().await {
        match cmd {
            Command::Record(buf) => {
                write_record(&mut console, &mut file, &stats, &buf).await;
            }
            Command::Flush(ack) => {
                flush_sinks(&mut console, &mut file, &stats).await;
                let _ = ack.send(());
            }
            Command::Shutdown(ack) => {
                // Stop accepting new records, then drain what is already
                // queued before acknowledging.
                rx.close();
                while let Some(cmd) = rx.recv().await {
                    match cmd {
                        Command::Record(buf) => {
                            write_record(&mut console, &mut file, &stats, &buf).await;
                        }
                        Command::Flush(late) => {
                            let _ = late.send(());
                        }
                        Command::Shutdown(late) => {
                            let _ = late.send(());
                        }
                    }
                }
                flush_sinks(&mut console, &mut file, &stats).await;
                let _ = ack.send(());
                return;
            }
        }
    }

    // Every sender is gone without an explicit shutdown; leave the sinks
    // flushed on the way out.
    flush_sinks(&mut console, &mut file, &stats).await;
}

async fn write_record<W>(
    console: &mut W,
    file: &mut Option<RotatingFileSink>,
    stats: &SinkStats,
    buf: &[u8],
) where
    W: AsyncWrite + Unpin,
{
    match console.write_all(buf).await {
        Ok(()) => {
            if let Err(e) = console.flush().await {
                stats.console_errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "console flush failed");
            }
        }
        Err(e) => {
            stats.console_errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "console write failed");
        }
    }

    if let Some(sink) = file.as_mut() {
        if let Err(e) = sink.write_all(buf).await {
            stats.file_errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "log file write failed");
        }
    }
}

async fn flush_sinks<W>(console: &mut W, file: &mut Option<RotatingFileSink>, stats: &SinkStats)
where
    W: AsyncWrite + Unpin,
{
    if let Err(e) = console.flush().await {
        stats.console_errors.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(error = %e, "console flush failed");
    }
    if let Some(sink) = file.as_mut() {
        if let Err(e) = sink.flush().await {
            stats.file_errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "log file flush failed");
        }
    }
}
