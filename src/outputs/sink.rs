//! The single writer behind the output channel.

use std::io;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{error, info, instrument};

/// Boxed output stream shared by nobody but the sink task.
pub type OutputStream = Box<dyn AsyncWrite + Unpin + Send>;

/// Open the output destination: the file at `path` in append mode, or stdout.
///
/// # Errors
///
/// Returns the I/O error when the file cannot be created or opened.
pub async fn open_output(path: Option<&Path>) -> io::Result<OutputStream> {
    match path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            info!(path = %path.display(), "Appending output to file");
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}

/// Write every record received on `records` to `out`, in arrival order.
///
/// Runs until all senders are dropped. A failed write is logged and the
/// record dropped; the sink keeps serving the remaining records.
/// Returns the number of records written.
#[instrument(level = "debug", skip_all)]
pub async fn run<W>(mut records: mpsc::Receiver<String>, mut out: W) -> usize
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0usize;
    while let Some(record) = records.recv().await {
        let result = match out.write_all(record.as_bytes()).await {
            Ok(()) => out.flush().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => written += 1,
            Err(e) => error!(error = %e, bytes = record.len(), "Failed to write entry"),
        }
    }
    written
}
