//! Delivery of scan reports to the management console.
//!
//! One `Publisher` per process (or per console) owns a long-lived pooled
//! HTTPS client; `publish` is a blocking call with a bounded retry loop.
//! Configuration is an explicit struct handed to the constructor — the
//! environment is only read where the caller asks for it
//! (`ConsoleConfig::from_env`).

#![forbid(unsafe_code)]

mod config;
mod publisher;

pub use config::{ConfigError, ConsoleConfig, DEFAULT_RETRY_DELAY};
pub use publisher::{PublishError, Publisher, MAX_ATTEMPTS};
