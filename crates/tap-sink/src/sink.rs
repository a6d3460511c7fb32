//! Single-writer event log.
//!
//! Callers on any thread format a line and `try_send` it into a bounded
//! queue. One dedicated thread, running a current-thread tokio runtime,
//! owns the file and is the only writer:
//!
//! ```text
//!  receive threads ──try_send──▶ [bounded mpsc] ──▶ writer thread ──▶ file
//!                                                    ▲
//!                                        flush every `flush_interval`
//! ```
//!
//! A full queue drops the line instead of blocking. Lines are written whole
//! by the single writer, so concurrent callers never interleave.
//!
//! [`EventSink::flush`] travels through the same queue, so it is answered
//! only after every line queued ahead of it has been written.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tap_core::Event;
use tap_protocol::format_event_line;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::SinkConfig;
use crate::error::SinkError;

const WRITER_THREAD_NAME: &str = "recv-tap-writer";

/// What travels from callers to the writer thread.
#[derive(Debug)]
enum Command {
    Line(String),
    /// Flush everything written so far; the ack carries whether it worked.
    Flush(oneshot::Sender<bool>),
}

/// Shared handle to the event log. `Send + Sync`; share it by reference
/// or `Arc`.
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::Sender<Command>,
    writer: JoinHandle<()>,
    dropped: AtomicU64,
    trace_key: Option<u64>,
    path: PathBuf,
}

impl EventSink {
    /// Open (create or append to) the configured log file and start the
    /// writer thread.
    ///
    /// The file is opened here rather than on the writer thread so that an
    /// unusable path is reported to the caller at initialization.
    pub fn open(config: &SinkConfig) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path)
            .map_err(|source| SinkError::Open {
                path: config.log_path.clone(),
                source,
            })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(SinkError::Runtime)?;

        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let flush_interval = config.flush_interval;

        let writer = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    run_writer(rx, File::from_std(file), flush_interval).await;
                });
            })
            .map_err(SinkError::Spawn)?;

        info!(
            path = %config.log_path.display(),
            capacity = config.queue_capacity,
            flush_ms = flush_interval.as_millis() as u64,
            "event sink opened"
        );

        Ok(EventSink {
            tx,
            writer,
            dropped: AtomicU64::new(0),
            trace_key: config.trace_key,
            path: config.log_path.clone(),
        })
    }

    /// Queue one event line. Returns `false` if the line was dropped.
    pub fn log_event(&self, event: &Event) -> bool {
        self.enqueue(format_event_line(event))
    }

    /// Queue one free-text line. Returns `false` if the line was dropped.
    pub fn log_text(&self, line: &str) -> bool {
        self.enqueue(line.to_string())
    }

    /// Lines dropped so far because the queue was full or the writer
    /// had stopped.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `key` is the configured debug trace key.
    pub fn traces(&self, key: u64) -> bool {
        self.trace_key == Some(key)
    }

    /// Wait until every line queued before this call is written and
    /// flushed to the file. Returns `false` if the writer has stopped or
    /// the flush failed.
    ///
    /// Blocks the calling thread, so do not call it from inside an async
    /// runtime. Unlike [`shutdown`](Self::shutdown) the sink stays usable.
    pub fn flush(&self) -> bool {
        let (ack, done) = oneshot::channel();
        if self.tx.blocking_send(Command::Flush(ack)).is_err() {
            return false;
        }
        done.blocking_recv().unwrap_or(false)
    }

    /// Close the queue, let the writer drain and flush, and wait for it.
    pub fn shutdown(self) {
        let EventSink { tx, writer, .. } = self;
        drop(tx);
        if writer.join().is_err() {
            error!("event writer thread panicked");
        }
    }

    fn enqueue(&self, line: String) -> bool {
        match self.tx.try_send(Command::Line(line)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.note_drop("queue full");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.note_drop("writer stopped");
                false
            }
        }
    }

    fn note_drop(&self, reason: &'static str) {
        // Warn once; after that the counter is the record.
        if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
            warn!(path = %self.path.display(), reason, "dropping event log lines");
        }
    }
}

async fn run_writer(mut rx: mpsc::Receiver<Command>, file: File, flush_interval: Duration) {
    let mut out = BufWriter::new(file);
    let mut ticker = interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut written: u64 = 0;
    let mut failed: u64 = 0;

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Line(line)) => match write_line(&mut out, &line).await {
                    Ok(()) => written += 1,
                    Err(e) => {
                        failed += 1;
                        if failed == 1 {
                            warn!(error = %e, "event log write failed; dropping line");
                        }
                    }
                },
                Some(Command::Flush(ack)) => {
                    let flushed = match out.flush().await {
                        Ok(()) => true,
                        Err(e) => {
                            warn!(error = %e, "event log flush failed");
                            false
                        }
                    };
                    // the caller may have stopped waiting
                    let _ = ack.send(flushed);
                }
                // every sender is gone and the queue is drained
                None => break,
            },
            _ = ticker.tick() => {
                if let Err(e) = out.flush().await {
                    warn!(error = %e, "event log flush failed");
                }
            }
        }
    }

    if let Err(e) = out.flush().await {
        error!(error = %e, "final event log flush failed");
    }
    debug!(written, failed, "event writer stopped");
}

async fn write_line(out: &mut BufWriter<File>, line: &str) -> std::io::Result<()> {
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await
}
