//! Report sinks for completed and in-flight IOC scans.
//!
//! Two independent surfaces over the same envelope:
//! - `file`: serialize a finished report to a pretty-printed JSON file
//! - `stream`: emit the report incrementally to a console as matches arrive
//!
//! Neither sink retains or mutates the report it is handed.

#![forbid(unsafe_code)]

mod error;
mod file;
mod stream;
mod summary;

pub use error::SinkError;
pub use file::write_report_file;
pub use stream::ConsoleStream;
pub use summary::summary_for;
