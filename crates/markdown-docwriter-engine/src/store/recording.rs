use std::cell::{Cell, RefCell};

use serde::Serialize;
use serde_json::{Value, json};

use super::{DocumentStore, Method, TransportError, endpoints};
use crate::wire::block_type;

/// One call made against a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedRequest {
    pub method: Method,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Number of entries in a children-insertion body.
    pub fn child_count(&self) -> usize {
        self.body
            .as_ref()
            .and_then(|b| b.get("children"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// How the store answers one request.
#[derive(Debug)]
pub enum Reply {
    /// Behave like a healthy store.
    Simulate,
    /// Reject this request (`Ok(None)`).
    Fail,
    Respond(Value),
    Raise(TransportError),
}

type Responder = Box<dyn FnMut(&RecordedRequest) -> Reply>;

/// In-memory [`DocumentStore`] that records every request in order.
///
/// By default it simulates a healthy store: inserted children are echoed
/// back with generated block ids, table shells come back with one generated
/// cell id per cell, and document creation returns a generated document id.
pub struct RecordingStore {
    requests: RefCell<Vec<RecordedRequest>>,
    responder: RefCell<Responder>,
    next_id: Cell<u64>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::with_responder(|_| Reply::Simulate)
    }

    pub fn with_responder(responder: impl FnMut(&RecordedRequest) -> Reply + 'static) -> Self {
        Self {
            requests: RefCell::new(vec![]),
            responder: RefCell::new(Box::new(responder)),
            next_id: Cell::new(1),
        }
    }

    /// Every request so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn handle(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, TransportError> {
        let request = RecordedRequest {
            method,
            endpoint: endpoint.to_string(),
            body: body.cloned(),
        };
        let reply = {
            let mut responder = self.responder.borrow_mut();
            (&mut *responder)(&request)
        };
        let out = match reply {
            Reply::Simulate => Ok(Some(self.simulate(&request))),
            Reply::Fail => Ok(None),
            Reply::Respond(value) => Ok(Some(value)),
            Reply::Raise(err) => Err(err),
        };
        self.requests.borrow_mut().push(request);
        out
    }

    fn simulate(&self, request: &RecordedRequest) -> Value {
        let endpoint = request.endpoint.as_str();
        let body = request.body.as_ref().unwrap_or(&Value::Null);
        match request.method {
            Method::Post if endpoint.ends_with("/children") => {
                let children: Vec<Value> = body
                    .get("children")
                    .and_then(Value::as_array)
                    .map(|children| children.iter().map(|c| self.echo_child(c)).collect())
                    .unwrap_or_default();
                json!({ "children": children })
            }
            Method::Post if endpoint == endpoints::DOCUMENTS => json!({
                "document": {
                    "document_id": self.fresh_id("doc"),
                    "title": body.get("title").cloned().unwrap_or(Value::Null),
                }
            }),
            Method::Post if endpoint == endpoints::SEARCH => json!({ "docs_entities": [] }),
            Method::Post => match token_between(endpoint, "/drive/v1/permissions/", "/public") {
                Some(token) => json!({ "url": endpoints::document_url(token) }),
                None => json!({}),
            },
            Method::Get => match endpoint.strip_prefix("/drive/v1/files/") {
                Some(token) => json!({
                    "token": token,
                    "name": "Untitled",
                    "type": "docx",
                    "url": endpoints::document_url(token),
                }),
                None => json!({}),
            },
            Method::Delete => json!({}),
        }
    }

    fn echo_child(&self, child: &Value) -> Value {
        let mut out = child.clone();
        if let Some(obj) = out.as_object_mut() {
            obj.insert("block_id".to_string(), Value::from(self.fresh_id("blk")));
        }

        let is_table = child.get("block_type").and_then(Value::as_u64)
            == Some(u64::from(block_type::TABLE));
        if is_table {
            let property = child.pointer("/table/property");
            let dim = |key: &str| {
                property
                    .and_then(|p| p.get(key))
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
            };
            let cells: Vec<String> = (0..dim("row_size") * dim("column_size"))
                .map(|_| self.fresh_id("cell"))
                .collect();
            if let Some(table) = out.get_mut("table").and_then(Value::as_object_mut) {
                table.insert("cells".to_string(), json!(cells));
            }
        }
        out
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        format!("{prefix}_{id}")
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for RecordingStore {
    fn get(&self, endpoint: &str) -> Result<Option<Value>, TransportError> {
        self.handle(Method::Get, endpoint, None)
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<Option<Value>, TransportError> {
        self.handle(Method::Post, endpoint, Some(body))
    }

    fn delete(&self, endpoint: &str) -> Result<Option<Value>, TransportError> {
        self.handle(Method::Delete, endpoint, None)
    }
}

fn token_between<'a>(endpoint: &'a str, prefix: &str, suffix: &str) -> Option<&'a str> {
    endpoint.strip_prefix(prefix)?.strip_suffix(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_requests_in_order() {
        let store = RecordingStore::new();
        store.get("/a").unwrap();
        store.post("/b", &json!({"x": 1})).unwrap();
        store.delete("/c").unwrap();

        let methods: Vec<Method> = store.requests().iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![Method::Get, Method::Post, Method::Delete]);
        assert_eq!(store.requests()[1].body, Some(json!({"x": 1})));
    }

    #[test]
    fn simulated_children_get_block_ids() {
        let store = RecordingStore::new();
        let reply = store
            .post(
                &endpoints::children("d", "d"),
                &json!({"children": [{"block_type": 2}, {"block_type": 22}], "index": -1}),
            )
            .unwrap()
            .unwrap();
        let children = reply["children"].as_array().unwrap();
        assert_eq!(children.len(), 2);
        assert!(children[0]["block_id"].is_string());
        assert_eq!(store.requests()[0].child_count(), 2);
    }

    #[test]
    fn simulated_table_shell_has_all_cells() {
        let store = RecordingStore::new();
        let reply = store
            .post(
                &endpoints::children("d", "d"),
                &json!({"children": [{
                    "block_type": 31,
                    "table": {"property": {"row_size": 2, "column_size": 3}}
                }]}),
            )
            .unwrap()
            .unwrap();
        assert_eq!(reply["children"][0]["table"]["cells"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn responder_can_fail_and_raise() {
        let mut calls = 0;
        let store = RecordingStore::with_responder(move |_| {
            calls += 1;
            match calls {
                1 => Reply::Fail,
                _ => Reply::Raise(TransportError::Auth("denied".into())),
            }
        });
        assert!(store.get("/x").unwrap().is_none());
        assert!(matches!(store.get("/y"), Err(TransportError::Auth(_))));
        assert_eq!(store.request_count(), 2);
    }

    #[test]
    fn simulated_document_creation() {
        let store = RecordingStore::new();
        let reply = store
            .post(endpoints::DOCUMENTS, &json!({"title": "T"}))
            .unwrap()
            .unwrap();
        assert!(reply["document"]["document_id"].as_str().unwrap().starts_with("doc_"));
        assert_eq!(reply["document"]["title"], "T");
    }
}
