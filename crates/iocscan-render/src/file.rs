use crate::SinkError;
use iocscan_types::ScanReport;
use std::fs;
use std::path::Path;

/// Write a completed report as a 2-space-indented JSON document.
///
/// The full document is serialized in memory first, then written in a single
/// call; an existing file at `path` is overwritten. On failure the
/// destination contents are best-effort only.
pub fn write_report_file(report: &ScanReport, path: &Path) -> Result<(), SinkError> {
    let bytes = serde_json::to_vec_pretty(report)?;
    fs::write(path, bytes).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}
