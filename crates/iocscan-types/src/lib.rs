//! Stable DTOs for the IOC scan reporting path.
//!
//! This crate is intentionally boring:
//! - the match record and report envelope emitted by a scan
//! - the serialized field names shared by every sink
//!
//! The detection engine constructs these; the sinks in `iocscan-render` and
//! the publisher in `iocscan-publish` only ever read them.

#![forbid(unsafe_code)]

pub mod names;
pub mod report;

pub use report::{IocMatch, ScanReport, ScanTarget};
