//! Read outcome classification.
//!
//! The remote service answers HTTP 200 with an `errors` array and null data
//! for unrelated internal failures, so the error array alone says nothing
//! about whether the record still exists. Only the identifier of the returned
//! record is used as the signal.

use gqlkit::Response;
use serde_json::Value;
use std::fmt;

/// Result of a read, as seen by the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Record returned without errors.
    Success,
    /// No record identifier came back; the record was deleted remotely.
    RecordGone,
    /// Errors reported while the record still exists.
    GenuineFailure,
    /// No errors, but no usable record either. The envelope is malformed and
    /// says nothing about existence.
    Malformed,
}

impl fmt::Display for ReadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::RecordGone => f.write_str("record gone"),
            Self::GenuineFailure => f.write_str("genuine failure"),
            Self::Malformed => f.write_str("malformed response"),
        }
    }
}

/// Identifier of the record at `path`, if non-empty.
pub fn record_id<'a>(response: &'a Response, path: &[&str]) -> Option<&'a str> {
    response
        .get(path)?
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Whether the member at `path` is present and explicitly null.
fn is_explicit_null(response: &Response, path: &[&str]) -> bool {
    path.iter()
        .try_fold(response.data.as_ref(), |current, key| Some(current?.get(key)))
        .flatten()
        .is_some_and(Value::is_null)
}

/// Classify a read envelope by the record found at `path`.
///
/// Without errors, only an explicit `null` record counts as gone.
pub fn classify(response: &Response, path: &[&str]) -> ReadOutcome {
    match (response.has_errors(), record_id(response, path).is_some()) {
        (false, true) => ReadOutcome::Success,
        (true, true) => ReadOutcome::GenuineFailure,
        (true, false) => ReadOutcome::RecordGone,
        (false, false) if is_explicit_null(response, path) => ReadOutcome::RecordGone,
        (false, false) => ReadOutcome::Malformed,
    }
}
