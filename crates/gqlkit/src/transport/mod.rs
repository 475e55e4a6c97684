//! Transport trait and implementations for executing GraphQL requests.
//!
//! [`http::HttpTransport`] talks to a real endpoint. [`MockTransport`] answers
//! from scripted envelopes and records every request, for tests:
//!
//! ```
//! use gqlkit::{MockTransport, Operation, OperationKind, Request, RequestContext, Response, Transport};
//! use serde_json::json;
//!
//! let mock = MockTransport::new();
//! mock.push(OperationKind::Read, Response::ok(json!({"outpost": {"id": "o-1"}})));
//!
//! let request = Request::new("query { outpost { id } }", &json!({})).unwrap();
//! let op = Operation::new("outpost", OperationKind::Read);
//! let response = mock.execute(&RequestContext::new(), &request, op).unwrap();
//! assert_eq!(response.get(&["outpost", "id"]), Some(&json!("o-1")));
//! assert_eq!(mock.requests().len(), 1);
//! ```

pub mod http;

use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::types::{Operation, OperationKind, Request, Response};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Executes one GraphQL request and returns the decoded envelope.
///
/// Implementations return `Err` only for transport-level failures (network,
/// non-success status, undecodable body, cancellation). Remote GraphQL
/// errors come back inside [`Response::errors`], even alongside null data.
pub trait Transport: Send + Sync {
    /// Execute `request`.
    ///
    /// `op` names the resource category and CRUD kind for logging and
    /// metrics; it has no effect on what is sent.
    fn execute(&self, ctx: &RequestContext, request: &Request, op: Operation) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, ctx: &RequestContext, request: &Request, op: Operation) -> Result<Response> {
        (**self).execute(ctx, request, op)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, ctx: &RequestContext, request: &Request, op: Operation) -> Result<Response> {
        (**self).execute(ctx, request, op)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, ctx: &RequestContext, request: &Request, op: Operation) -> Result<Response> {
        (**self).execute(ctx, request, op)
    }
}

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Operation metadata passed by the caller.
    pub op: Operation,
    /// The request as it would have gone on the wire.
    pub request: Request,
}

/// Mock transport for testing without network access.
///
/// Responses are queued per [`OperationKind`] and consumed in order. An empty
/// queue yields a transport error so missing scripting is loud.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<OperationKind, VecDeque<Result<Response>>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create a mock with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an envelope for the next request of `kind`.
    pub fn push(&self, kind: OperationKind, response: Response) {
        self.push_result(kind, Ok(response));
    }

    /// Queue a transport failure for the next request of `kind`.
    pub fn push_error(&self, kind: OperationKind, error: Error) {
        self.push_result(kind, Err(error));
    }

    fn push_result(&self, kind: OperationKind, result: Result<Response>) {
        lock(&self.responses).entry(kind).or_default().push_back(result);
    }

    /// All requests executed so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Requests of one kind, in order.
    pub fn requests_of(&self, kind: OperationKind) -> Vec<RecordedRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.op.kind == kind)
            .cloned()
            .collect()
    }

    /// Number of scripted responses not yet consumed.
    pub fn pending(&self) -> usize {
        lock(&self.responses).values().map(VecDeque::len).sum()
    }
}

impl Transport for MockTransport {
    fn execute(&self, ctx: &RequestContext, request: &Request, op: Operation) -> Result<Response> {
        ctx.check()?;

        lock(&self.requests).push(RecordedRequest {
            op,
            request: request.clone(),
        });

        lock(&self.responses)
            .get_mut(&op.kind)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(Error::Other(format!("no scripted response for {op}"))))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
