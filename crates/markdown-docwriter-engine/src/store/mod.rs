//! # Document Store Transport
//!
//! The writer reaches the remote document store only through the narrow
//! [`DocumentStore`] contract. Authentication, timeouts and retry policy
//! belong to the implementation behind it.
//!
//! Every call returns:
//! - `Ok(Some(data))` when the store accepted the request,
//! - `Ok(None)` when this one request failed (the caller carries on),
//! - `Err(TransportError)` when the transport gave up entirely.

pub mod recording;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

pub use recording::{RecordedRequest, RecordingStore, Reply};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{method} {endpoint} failed after {attempts} attempts: {reason}")]
    Exhausted {
        method: Method,
        endpoint: String,
        attempts: u32,
        reason: String,
    },

    #[error("Failed to authenticate with the document store: {0}")]
    Auth(String),

    #[error("Failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Blocking access to the remote document store.
pub trait DocumentStore {
    fn get(&self, endpoint: &str) -> Result<Option<Value>, TransportError>;

    fn post(&self, endpoint: &str, body: &Value) -> Result<Option<Value>, TransportError>;

    fn delete(&self, endpoint: &str) -> Result<Option<Value>, TransportError>;
}

/// Encodes a request body struct as the JSON value the store accepts.
pub fn encode_body<T: Serialize>(body: &T) -> Result<Value, TransportError> {
    Ok(serde_json::to_value(body)?)
}

/// Endpoint paths on the remote store.
pub mod endpoints {
    pub const DOCUMENTS: &str = "/docx/v1/documents";
    pub const SEARCH: &str = "/suite/docs-api/search/object";
    pub const DOCUMENT_URL_BASE: &str = "https://feishu.cn/docx";

    /// Child insertion under `parent_id` (a document root, block or table cell).
    pub fn children(document_id: &str, parent_id: &str) -> String {
        format!("{DOCUMENTS}/{document_id}/blocks/{parent_id}/children")
    }

    pub fn file(token: &str) -> String {
        format!("/drive/v1/files/{token}")
    }

    pub fn public_permission(token: &str) -> String {
        format!("/drive/v1/permissions/{token}/public")
    }

    pub fn document_url(document_id: &str) -> String {
        format!("{DOCUMENT_URL_BASE}/{document_id}")
    }

}
