//! HTTP client construction and transport-level error classification.
//!
//! "Transport" means the request never produced a response: DNS, connect,
//! TLS, timeout, or a request that could not be built at all. Responses with
//! a status code, whatever the code, are not transport errors.

use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-attempt timeout applied when nothing else is configured
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-level HTTP settings
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Upper bound on a single attempt, connect through body
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

/// A request that did not get a response back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not reach the host
    Connect(String),
    /// Attempt exceeded the request timeout
    Timeout(String),
    /// The request itself is malformed (bad URL, bad header value)
    Request(String),
    /// Anything else that broke mid-flight
    Other(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(m) => write!(f, "connect failed: {m}"),
            Self::Timeout(m) => write!(f, "timed out: {m}"),
            Self::Request(m) => write!(f, "invalid request: {m}"),
            Self::Other(m) => write!(f, "transport error: {m}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl TransportError {
    /// Classify a reqwest error that occurred before a response arrived.
    ///
    /// The URL is stripped from the message so tokens embedded in query
    /// strings never reach the logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        let kind: fn(String) -> Self = if e.is_builder() {
            Self::Request
        } else if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect
        } else {
            Self::Other
        };
        kind(e.without_url().to_string())
    }

    /// A malformed request fails identically every time; everything else may
    /// succeed on another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Request(_))
    }
}

/// Build the pooled async client used for every dispatch in a run.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
        .map_err(TransportError::from_reqwest)
}

/// Single-threaded runtime: all dispatches interleave on the calling thread.
pub fn current_thread_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_not_retryable() {
        assert!(!TransportError::Request("bad url".into()).is_retryable());
    }

    #[test]
    fn connect_error_retryable() {
        assert!(TransportError::Connect("refused".into()).is_retryable());
    }

    #[test]
    fn timeout_retryable() {
        assert!(TransportError::Timeout("30s".into()).is_retryable());
    }

    #[test]
    fn other_retryable() {
        assert!(TransportError::Other("reset".into()).is_retryable());
    }

    #[test]
    fn display_connect() {
        let err = TransportError::Connect("refused".into());
        assert_eq!(format!("{err}"), "connect failed: refused");
    }

    #[test]
    fn display_request() {
        let err = TransportError::Request("relative URL".into());
        assert!(format!("{err}").starts_with("invalid request"));
    }

    #[test]
    fn default_config_timeouts() {
        let config = HttpConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn build_client_with_defaults() {
        assert!(build_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn runtime_runs_future() {
        let rt = current_thread_runtime().unwrap();
        assert_eq!(rt.block_on(async { 7 }), 7);
    }
}
