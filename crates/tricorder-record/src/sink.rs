// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Envelope sinks: where published messages go.
//!
//! The file sink owns its output stream on a single background thread.
//! Producers hand envelopes over an unbounded channel and never block on
//! I/O; `shutdown` is the one blocking call and guarantees a drained,
//! flushed stream on return.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::warn;
use tricorder_proto::{ndjson, Envelope};

/// A destination for published envelopes.
///
/// Implementations must accept publishes from arbitrary threads.
pub trait EnvelopeSink: Send + Sync {
    /// Accepts one envelope for delivery.
    fn publish(&self, envelope: Envelope);
}

/// File sink failures. Only startup can fail; per-message write failures
/// degrade to diagnostics.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The destination file could not be created.
    #[error("[SINK_CREATE] cannot create trace file `{path}`: {source}")]
    Create {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The writer thread could not be spawned.
    #[error("[SINK_SPAWN] cannot spawn trace writer thread: {source}")]
    Spawn {
        /// Underlying spawn failure.
        #[source]
        source: std::io::Error,
    },
}

/// NDJSON sink draining an unbounded queue onto one writer.
///
/// Publishes after [`shutdown`](Self::shutdown) are dropped silently;
/// the stream is complete once `shutdown` returns. Dropping the sink
/// shuts it down.
pub struct NdjsonFileSink {
    sender: Mutex<Option<Sender<Envelope>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for NdjsonFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdjsonFileSink").finish_non_exhaustive()
    }
}

impl NdjsonFileSink {
    /// Creates the destination file (and its parent directories) and
    /// starts the writer thread.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Create`] when the file or its directories
    /// cannot be created, [`SinkError::Spawn`] when the writer thread
    /// cannot start.
    pub fn start(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SinkError::Create {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }
        let file = File::create(path).map_err(|source| SinkError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Self::start_with_writer(Box::new(BufWriter::new(file)))
    }

    /// Starts the writer thread over an arbitrary stream. Seam for tests
    /// and in-memory consumers.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Spawn`] when the writer thread cannot start.
    pub fn start_with_writer(writer: Box<dyn Write + Send>) -> Result<Self, SinkError> {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("tricorder-sink".to_string())
            .spawn(move || drain(&rx, writer))
            .map_err(|source| SinkError::Spawn { source })?;
        Ok(Self {
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Signals end of input and blocks until the queue is drained and the
    /// stream flushed. Idempotent; later publishes are dropped.
    pub fn shutdown(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        drop(sender);
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                warn!("trace writer thread panicked before draining");
            }
        }
    }
}

impl EnvelopeSink for NdjsonFileSink {
    fn publish(&self, envelope: Envelope) {
        let sender = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = sender.as_ref() {
            // A send fails only against a worker that already exited;
            // shutdown has closed the stream and the envelope is dropped.
            let _ = tx.send(envelope);
        }
    }
}

impl Drop for NdjsonFileSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Writer-thread loop: drains the queue until every sender is gone, then
/// flushes. A failed write drops that envelope and keeps the stream going.
fn drain(rx: &Receiver<Envelope>, mut out: Box<dyn Write + Send>) {
    while let Ok(envelope) = rx.recv() {
        if let Err(err) = ndjson::write_envelope(&mut out, &envelope) {
            warn!(content = envelope.content_name(), ?err, "dropping envelope, write failed");
        }
    }
    if let Err(err) = out.flush() {
        warn!(?err, "trace stream flush failed");
    }
}
