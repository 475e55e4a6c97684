//! Blocking HTTP transport.
//!
//! POSTs the request envelope as JSON and decodes the response envelope.
//! Transient failures are retried here, bounded by the caller's deadline.

use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::retry::{LogCallback, RetryConfig, with_retry};
use crate::transport::Transport;
use crate::types::{Operation, Request, Response};
use std::time::Duration;

/// Maximum response body size (GraphQL reads with clusters stay well below).
const MAX_BODY_SIZE: u64 = 16 * 1024 * 1024;

/// Maximum length of a non-2xx body echoed into an error message.
const MAX_ERROR_BODY: usize = 512;

const USER_AGENT: &str = concat!("gqlkit/", env!("CARGO_PKG_VERSION"));

/// GraphQL-over-HTTP transport.
///
/// # Example
///
/// ```no_run
/// use gqlkit::{HttpTransport, Operation, OperationKind, Request, RequestContext, Transport};
/// use serde_json::json;
///
/// let transport = HttpTransport::new("https://api.example.com/graphql")
///     .with_token("secret");
/// let request = Request::new("query { viewer { id } }", &json!({})).unwrap();
/// let op = Operation::new("viewer", OperationKind::Read);
/// let response = transport.execute(&RequestContext::new(), &request, op).unwrap();
/// println!("{:?}", response.data);
/// ```
pub struct HttpTransport {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// GraphQL endpoint URL.
    endpoint: String,
    /// Bearer token, if any.
    token: Option<String>,
    /// Timeout applied when the context carries no deadline.
    timeout: Duration,
    /// Transport-level retry policy.
    retry: RetryConfig,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with default timeout and retry.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: endpoint.into(),
            token: None,
            timeout: Duration::from_secs(60),
            retry: RetryConfig::default(),
        }
    }

    /// Authenticate with a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout used when the context has no deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Timeout for one attempt: the smaller of the configured timeout and
    /// what is left before the context deadline.
    fn attempt_timeout(&self, ctx: &RequestContext) -> Duration {
        ctx.remaining()
            .map_or(self.timeout, |left| left.min(self.timeout))
    }

    fn send_once(&self, ctx: &RequestContext, request: &Request) -> Result<Response> {
        let mut builder = self
            .agent
            .post(&self.endpoint)
            .config()
            .timeout_global(Some(self.attempt_timeout(ctx)))
            .build()
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let mut response = builder.send_json(request)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(Error::http(status.as_u16(), truncate(&body, MAX_ERROR_BODY)));
        }

        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_json::<Response>()
            .map_err(|e| Error::Protocol(e.to_string()))
    }
}

impl Transport for HttpTransport {
    fn execute(&self, ctx: &RequestContext, request: &Request, op: Operation) -> Result<Response> {
        log::debug!("graphql {op} -> {}", self.endpoint);

        let response = with_retry(&self.retry, ctx, Some(&LogCallback), || {
            self.send_once(ctx, request)
        })?;

        if response.has_errors() {
            log::debug!("graphql {op} returned {} error(s)", response.errors.len());
        }
        Ok(response)
    }
}

fn truncate(body: &str, max: usize) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= max {
        return trimmed.to_string();
    }
    let mut end = max;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
