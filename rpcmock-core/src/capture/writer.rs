//! Background capture writer
//!
//! A single task owns the log file and drains an unbounded queue, so appends
//! are serialized and never interleave. Every record is flushed as soon as it
//! is written. Failures are logged and the record is dropped; they never
//! reach the caller whose call was captured.

use crate::document::Document;
use crate::error::{MockError, Result};
use crate::record::{Record, encode_record};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::runtime::Handle;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

enum WriterCommand {
    Append(Box<Record>),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Appends captured records to a log file from a background task
pub struct CaptureWriter {
    path: PathBuf,
    tx: mpsc::UnboundedSender<WriterCommand>,
    task: Mutex<Option<JoinHandle<u64>>>,
}

impl CaptureWriter {
    /// Create (or truncate) the log at `path` and start the writer task.
    ///
    /// Fails with [`MockError::Configuration`] when called outside a tokio
    /// runtime.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let runtime = Handle::try_current().map_err(|e| {
            MockError::Configuration(format!(
                "capture writer for {} needs a tokio runtime: {}",
                path.display(),
                e
            ))
        })?;
        let file = std::fs::File::create(&path).map_err(|source| MockError::File {
            path: path.clone(),
            source,
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let task = runtime.spawn(run_writer(
            tokio::fs::File::from_std(file),
            path.clone(),
            rx,
        ));
        tracing::info!(path = %path.display(), "capture writer started");

        Ok(Self {
            path,
            tx,
            task: Mutex::new(Some(task)),
        })
    }

    /// Path of the log being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue one completed call for writing. Never blocks and never fails.
    pub fn capture(
        &self,
        service: &str,
        method: &str,
        request: Document,
        response: Document,
        error: Option<&str>,
    ) {
        let mut record =
            Record::new(service, method, request, response).with_captured_at(Utc::now());
        if let Some(error) = error {
            record.error = error.to_string();
        }
        self.enqueue(record);
    }

    /// Queue a prepared record for writing
    pub fn enqueue(&self, record: Record) {
        if self.tx.send(WriterCommand::Append(Box::new(record))).is_err() {
            tracing::warn!(
                path = %self.path.display(),
                "capture writer is closed, dropping record"
            );
        }
    }

    /// Wait until every record queued before this call has been written
    pub async fn drain(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        if self.tx.send(WriterCommand::Flush(ack)).is_err() {
            return Ok(());
        }
        // A dropped ack means the task already stopped; nothing is pending.
        let _ = done.await;
        Ok(())
    }

    /// Write everything queued, stop the task and return how many records
    /// it wrote. Later calls return 0.
    pub async fn close(&self) -> Result<u64> {
        let Some(task) = self.task.lock().await.take() else {
            return Ok(0);
        };
        let _ = self.tx.send(WriterCommand::Shutdown);
        task.await
            .map_err(|e| MockError::Other(format!("capture writer task failed: {}", e)))
    }
}

async fn run_writer(
    file: tokio::fs::File,
    path: PathBuf,
    mut rx: mpsc::UnboundedReceiver<WriterCommand>,
) -> u64 {
    let mut out = BufWriter::new(file);
    let mut written = 0u64;

    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Append(record) => match append(&mut out, &record).await {
                Ok(()) => {
                    written += 1;
                    tracing::debug!(key = %record.key(), written, "captured record");
                }
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        key = %record.key(),
                        error = %e,
                        "failed to write captured record"
                    );
                }
            },
            WriterCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            WriterCommand::Shutdown => break,
        }
    }

    if let Err(e) = out.flush().await {
        tracing::error!(path = %path.display(), error = %e, "failed to flush capture log");
    }
    tracing::info!(path = %path.display(), records = written, "capture writer closed");
    written
}

async fn append(out: &mut BufWriter<tokio::fs::File>, record: &Record) -> Result<()> {
    let text = encode_record(record)?;
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}
