use std::env;
use std::time::Duration;
use thiserror::Error;

/// Pause between attempts when the console answers with a non-200 status.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

const ENV_CONSOLE_URL: &str = "MGMT_CONSOLE_URL";
const ENV_CONSOLE_PORT: &str = "MGMT_CONSOLE_PORT";
const ENV_API_KEY: &str = "DEEPFENCE_KEY";

const DEFAULT_HTTPS_PORT: &str = "443";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} is not set")]
    MissingVar { name: &'static str },
}

/// Connection settings for the management console ingest API.
///
/// Read once at startup and passed by reference into [`crate::Publisher`];
/// there is no process-global state.
#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    /// Scheme plus host, with the port appended when it is not the HTTPS
    /// default (e.g. `https://console.internal:8443`).
    pub base_url: String,
    /// Value of the `deepfence-key` authentication header. May be empty for
    /// consoles that do not enforce authentication.
    pub api_key: String,
    /// Skip TLS certificate validation. Off unless explicitly requested;
    /// `from_env` turns it on because deployed consoles are routinely
    /// self-signed.
    pub insecure_skip_verify: bool,
    pub retry_delay: Duration,
}

impl ConsoleConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            insecure_skip_verify: false,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Build the config from `MGMT_CONSOLE_URL`, `MGMT_CONSOLE_PORT`, and
    /// `DEEPFENCE_KEY`. The host is required; the other two may be unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var(ENV_CONSOLE_URL)
            .ok()
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingVar {
                name: ENV_CONSOLE_URL,
            })?;
        let port = env::var(ENV_CONSOLE_PORT).unwrap_or_default();
        let api_key = env::var(ENV_API_KEY).unwrap_or_default();

        Ok(Self {
            base_url: base_url_for(&host, &port),
            api_key,
            insecure_skip_verify: true,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }
}

fn base_url_for(host: &str, port: &str) -> String {
    if port.is_empty() || port == DEFAULT_HTTPS_PORT {
        format!("https://{host}")
    } else {
        format!("https://{host}:{port}")
    }
}
