//! # gqlkit
//!
//! Blocking GraphQL transport.
//!
//! - [`Request`] / [`Response`]: the `{query, variables}` and `{data, errors}`
//!   envelopes, reproduced exactly
//! - [`Transport`]: executes one request; [`HttpTransport`] over `ureq`,
//!   [`MockTransport`] for tests
//! - [`RequestContext`]: caller cancellation and deadline, checked before
//!   every attempt
//! - [`retry`]: exponential backoff for transient failures, applied inside
//!   the transport only
//!
//! Remote GraphQL errors are data, not transport failures: a 200 response
//! with a populated `errors` array decodes successfully and the caller
//! decides what it means.

pub mod context;
pub mod error;
pub mod retry;
pub mod transport;
pub mod types;

pub use context::{CancelToken, RequestContext};
pub use error::{Error, ErrorCategory, Result};
pub use retry::RetryConfig;
pub use transport::http::HttpTransport;
pub use transport::{MockTransport, RecordedRequest, Transport};
pub use types::{GraphQlError, Operation, OperationKind, Request, Response};
