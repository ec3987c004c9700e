use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure writing a report through a local sink.
///
/// Neither variant is retried here: a serialization failure is a data-shape
/// defect, and file-write failures are surfaced with the destination path so
/// the operator can diagnose them.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("could not serialize scan report")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write scan report to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
