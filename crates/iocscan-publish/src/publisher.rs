use crate::ConsoleConfig;
use reqwest::blocking::Client;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Total tries per publish: the initial request plus five retries.
pub const MAX_ATTEMPTS: u32 = 6;

const INGEST_PATH: &str = "/df-api/ingest";
const AUTH_HEADER: &str = "deepfence-key";

const POOL_MAX_IDLE_PER_HOST: usize = 1024;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15 * 60);
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Error)]
pub enum PublishError {
    /// Connection-level failure (DNS, TCP, TLS, timeout). Not retried:
    /// an unreachable console will not become reachable within the loop.
    #[error("could not reach the management console")]
    Transport(#[from] reqwest::Error),

    /// The console stayed reachable but kept answering with a non-200
    /// status until the attempts were exhausted.
    #[error("console returned status {status} after {attempts} attempts")]
    Status { status: u16, attempts: u32 },
}

/// Blocking publisher for scan-result payloads.
///
/// Owns one pooled client for its lifetime; sequential and concurrent
/// `publish` calls share the pool rather than re-doing TLS setup per call.
pub struct Publisher {
    client: Client,
    config: ConsoleConfig,
}

impl Publisher {
    pub fn new(config: ConsoleConfig) -> Result<Self, PublishError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .tcp_keepalive(KEEPALIVE_INTERVAL)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// POST the payload to `{base_url}/df-api/ingest?doc_type={doc_type}`.
    ///
    /// The ingest endpoint expects single-line JSON framing, so embedded
    /// newlines are collapsed to spaces. Exactly status 200 counts as
    /// success; any other status is retried after
    /// [`ConsoleConfig::retry_delay`] until [`MAX_ATTEMPTS`] is reached.
    /// The response body is dropped on every path so the pooled connection
    /// is released.
    pub fn publish(&self, payload: &str, doc_type: &str) -> Result<(), PublishError> {
        let body = payload.replace('\n', " ");
        let url = format!("{}{INGEST_PATH}", self.config.base_url);

        let mut attempt: u32 = 1;
        loop {
            let response = self
                .client
                .post(&url)
                .query(&[("doc_type", doc_type)])
                .header(AUTH_HEADER, self.config.api_key.as_str())
                .body(body.clone())
                .send()?;
            let status = response.status().as_u16();
            drop(response);

            if status == 200 {
                debug!(doc_type, attempt, "scan results ingested");
                return Ok(());
            }
            if attempt >= MAX_ATTEMPTS {
                return Err(PublishError::Status {
                    status,
                    attempts: attempt,
                });
            }
            warn!(doc_type, attempt, status, "console rejected ingest, retrying");
            thread::sleep(self.config.retry_delay);
            attempt += 1;
        }
    }
}
