//! In-memory outpost service for scenario tests.

use crate::model::ProviderKind;
use gqlkit::{GraphQlError, Operation, OperationKind, Request, RequestContext, Response, Transport};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

const INTERNAL_ERROR: &str = "oops! an internal error has occurred. for reference purposes, this is your request id: 0c1d";

/// Answers the outpost documents the way the remote service does, including
/// its HTTP 200 + errors + null data reply for unknown identifiers.
#[derive(Debug, Default)]
pub struct FakeOutposts {
    records: Mutex<BTreeMap<String, Value>>,
    calls: Mutex<Vec<OperationKind>>,
    next_id: Mutex<usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeOutposts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored record, as the read query would return it.
    pub fn record(&self, id: &str) -> Option<Value> {
        lock(&self.records).get(id).cloned()
    }

    /// Delete a record behind the engine's back.
    pub fn remove(&self, id: &str) {
        lock(&self.records).remove(id);
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn calls(&self) -> Vec<OperationKind> {
        lock(&self.calls).clone()
    }

    fn missing() -> Response {
        Response::failed(vec![GraphQlError::new(INTERNAL_ERROR)])
    }

    fn create(&self, input: &Value) -> Response {
        let id = {
            let mut next = lock(&self.next_id);
            *next += 1;
            format!("o-{next}")
        };
        let mut record = Map::new();
        record.insert("id".into(), json!(id));
        for key in ["name", "enabled", "selfManaged", "serviceType", "allowedRegions", "managedConfig", "customConfig"] {
            if let Some(value) = input.get(key) {
                record.insert(key.into(), value.clone());
            }
        }
        let config = input
            .get("config")
            .and_then(Value::as_object)
            .and_then(|wrapper| wrapper.iter().next())
            .and_then(|(key, inner)| {
                let kind = ProviderKind::CONFIGURED
                    .into_iter()
                    .find(|k| k.input_key() == Some(key.as_str()))?;
                let mut inner = inner.as_object().cloned().unwrap_or_default();
                inner.insert("__typename".into(), json!(kind.typename()));
                Some(Value::Object(inner))
            });
        record.insert("config".into(), config.unwrap_or(Value::Null));
        record.insert("status".into(), json!("CONNECTED"));
        record.insert("errorCode".into(), Value::Null);
        record.insert("createdAt".into(), json!("2024-05-01T10:00:00Z"));
        record.insert("clusters".into(), json!([]));
        lock(&self.records).insert(id.clone(), Value::Object(record));
        Response::ok(json!({"createOutpost": {"outpost": {"id": id}}}))
    }

    fn update(&self, input: &Value) -> Response {
        let id = input.get("id").and_then(Value::as_str).unwrap_or_default();
        let mut records = lock(&self.records);
        let Some(Value::Object(record)) = records.get_mut(id) else {
            return Self::missing();
        };
        if let Some(Value::Object(patch)) = input.get("patch") {
            for (key, value) in patch {
                record.insert(key.clone(), value.clone());
            }
        }
        Response::ok(json!({"updateOutpost": {"outpost": {"id": id}}}))
    }
}

impl Transport for FakeOutposts {
    fn execute(&self, ctx: &RequestContext, request: &Request, op: Operation) -> gqlkit::Result<Response> {
        ctx.check()?;
        lock(&self.calls).push(op.kind);
        let input = request.variable("/input").cloned().unwrap_or(Value::Null);
        let response = match op.kind {
            OperationKind::Create => self.create(&input),
            OperationKind::Read => {
                let id = request.variable("/id").and_then(Value::as_str).unwrap_or_default();
                match self.record(id) {
                    Some(record) => Response::ok(json!({"outpost": record})),
                    None => Self::missing(),
                }
            }
            OperationKind::Update => self.update(&input),
            OperationKind::Delete => {
                let id = input.get("id").and_then(Value::as_str).unwrap_or_default();
                match lock(&self.records).remove(id) {
                    Some(_) => Response::ok(json!({"deleteControl": {"_stub": null}})),
                    None => Self::missing(),
                }
            }
        };
        Ok(response)
    }
}
