//! Per-record comment dispatch with retry and exponential backoff

use async_trait::async_trait;
use witimport_core::{HttpConfig, RetryPolicy, TransportError, build_client};

use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::record::ExpandedRecord;
use crate::render::{CommentBody, render_comment};

/// The single network call the dispatcher makes.
///
/// Resolves to the response status, whatever it is, or a [`TransportError`]
/// when no response arrived.
#[async_trait]
pub trait CommentTransport: Send + Sync {
    async fn post_comment(
        &self,
        url: &str,
        token: &str,
        body: &CommentBody,
    ) -> Result<u16, TransportError>;
}

/// Transport backed by a pooled reqwest client
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        Ok(Self::new(build_client(config)?))
    }
}

#[async_trait]
impl CommentTransport for ReqwestTransport {
    async fn post_comment(
        &self,
        url: &str,
        token: &str,
        body: &CommentBody,
    ) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;
        Ok(response.status().as_u16())
    }
}

/// Terminal result of dispatching one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { attempts: u32 },
    /// Last response was non-2xx
    Rejected { status: u16, attempts: u32 },
    /// Last attempt got no response
    TransportFailed { message: String, attempts: u32 },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts }
            | Self::Rejected { attempts, .. }
            | Self::TransportFailed { attempts, .. } => *attempts,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded { .. } => write!(f, "succeeded"),
            Self::Rejected { status, .. } => write!(f, "HTTP {status}"),
            Self::TransportFailed { message, .. } => write!(f, "{message}"),
        }
    }
}

/// Posts comments for records, retrying transient failures.
///
/// Retries on a transport error or on 409/503/504, waiting
/// `base_delay * 2^attempt` between attempts. Exhaustion resolves to a
/// failed [`Outcome`]; `dispatch` itself never errors.
pub struct Dispatcher<T> {
    transport: T,
    endpoint: Endpoint,
    token: String,
    policy: RetryPolicy,
}

impl<T: CommentTransport> Dispatcher<T> {
    pub fn new(
        transport: T,
        endpoint: Endpoint,
        token: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            endpoint,
            token: token.into(),
            policy,
        }
    }

    pub fn from_config(config: &Config, transport: T) -> Self {
        Self::new(transport, config.endpoint(), &config.token, config.retry)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Render and post the comment for one record.
    pub async fn dispatch(&self, record: &ExpandedRecord) -> Outcome {
        let url = self.endpoint.comments_url(record.work_item_id);
        let body = render_comment(record);
        log::debug!("#{}: POST {url}", record.work_item_id);
        log::debug!("#{}: payload {}", record.work_item_id, body.text);
        self.send_with_retry(&record.work_item_id.to_string(), &url, &body)
            .await
    }

    async fn send_with_retry(&self, label: &str, url: &str, body: &CommentBody) -> Outcome {
        let max = self.policy.max_attempts;
        let mut attempt = 0u32;
        loop {
            let attempts = attempt + 1;
            let (retryable, failure) =
                match self.transport.post_comment(url, &self.token, body).await {
                    Ok(status) if (200..300).contains(&status) => {
                        log::info!("#{label}: comment added (attempt {attempts}/{max})");
                        return Outcome::Succeeded { attempts };
                    }
                    Ok(status) => (
                        RetryPolicy::is_retryable_status(status),
                        Outcome::Rejected { status, attempts },
                    ),
                    Err(e) => (
                        e.is_retryable(),
                        Outcome::TransportFailed {
                            message: e.to_string(),
                            attempts,
                        },
                    ),
                };

            if retryable && self.policy.has_attempts_left(attempt) {
                let delay = self.policy.delay_after(attempt);
                log::info!(
                    "#{label}: attempt {attempts}/{max} failed ({failure}), retrying in {delay:?}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            } else {
                log::warn!("#{label}: failed permanently after {attempts} attempt(s): {failure}");
                return failure;
            }
        }
    }
}
