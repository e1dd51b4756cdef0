use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::store::{DocumentStore, TransportError, encode_body, endpoints};
use crate::writer::{DocumentWriter, WriteError, WriteSummary, WriterOptions};

/// Search results are capped at this many entries per request.
pub const MAX_SEARCH_RESULTS: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document store rejected creation of '{title}'")]
    CreateRejected { title: String },

    #[error("Document store did not return an id for '{title}'")]
    MissingId { title: String },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A newly created document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub title: String,
    pub url: String,
    pub folder_token: Option<String>,
    pub created_at: DateTime<Utc>,
    /// False when the content was empty or only partially written.
    pub content_written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<WriteSummary>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRef {
    pub token: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub url: String,
    pub owner: Option<String>,
}

/// File metadata as reported by the drive API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub token: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub url: Option<String>,
    pub created_time: Option<String>,
    pub modified_time: Option<String>,
    pub owner: Option<String>,
    pub size: Option<u64>,
    pub parent_token: Option<String>,
}

/// Public link access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    View,
    Edit,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permission::View => "view",
            Permission::Edit => "edit",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown permission '{0}', expected 'view' or 'edit'")]
pub struct ParsePermissionError(String);

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Permission::View),
            "edit" => Ok(Permission::Edit),
            _ => Err(ParsePermissionError(s.to_string())),
        }
    }
}

#[derive(Serialize)]
struct CreateBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_token: Option<&'a str>,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    search_key: &'a str,
    count: usize,
    offset: usize,
    owner_ids: Vec<String>,
    docs_types: Vec<String>,
}

#[derive(Serialize)]
struct ShareBody {
    #[serde(rename = "type")]
    permission: Permission,
    external_access: bool,
}

/// Document lifecycle operations over any [`DocumentStore`].
pub struct DocumentClient<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    options: WriterOptions,
}

impl<'s, S: DocumentStore + ?Sized> DocumentClient<'s, S> {
    pub fn new(store: &'s S, options: WriterOptions) -> Self {
        Self { store, options }
    }

    fn writer(&self) -> DocumentWriter<'s, S> {
        DocumentWriter::new(self.store, self.options)
    }

    /// Creates a document and writes `content` into it.
    ///
    /// A document whose content could not be written is still returned,
    /// with `content_written` unset.
    pub fn create_document(
        &self,
        title: &str,
        content: &str,
        folder_token: Option<&str>,
    ) -> Result<DocumentInfo, DocumentError> {
        log::info!("Creating document '{title}'");
        let body = encode_body(&CreateBody {
            title,
            folder_token,
        })?;

        let data = self
            .store
            .post(endpoints::DOCUMENTS, &body)?
            .ok_or_else(|| DocumentError::CreateRejected {
                title: title.to_string(),
            })?;
        let document_id = data
            .pointer("/document/document_id")
            .and_then(Value::as_str)
            .ok_or_else(|| DocumentError::MissingId {
                title: title.to_string(),
            })?
            .to_string();
        log::info!("Created document {document_id}");

        let summary = match self.writer().write(&document_id, content) {
            Ok(summary) => Some(summary),
            Err(WriteError::Empty) => None,
            Err(WriteError::Transport(e)) => return Err(e.into()),
        };
        let content_written = summary.as_ref().is_some_and(WriteSummary::is_success);
        if !content_written {
            log::warn!("Document {document_id} created, but writing its content failed");
        }

        Ok(DocumentInfo {
            url: endpoints::document_url(&document_id),
            document_id,
            title: title.to_string(),
            folder_token: folder_token.map(str::to_string),
            created_at: Utc::now(),
            content_written,
            summary,
        })
    }

    /// Appends `content` to an existing document.
    pub fn append_content(
        &self,
        document_id: &str,
        content: &str,
    ) -> Result<WriteSummary, DocumentError> {
        Ok(self.writer().write(document_id, content)?)
    }

    /// Full-text document search; a rejected search yields no results.
    pub fn search_documents(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<DocumentRef>, DocumentError> {
        log::info!("Searching documents for '{query}'");
        let body = encode_body(&SearchBody {
            search_key: query,
            count: limit.min(MAX_SEARCH_RESULTS),
            offset: 0,
            owner_ids: vec![],
            docs_types: vec![],
        })?;

        let Some(data) = self.store.post(endpoints::SEARCH, &body)? else {
            log::warn!("Search for '{query}' failed");
            return Ok(vec![]);
        };

        let found: Vec<DocumentRef> = data
            .get("docs_entities")
            .and_then(Value::as_array)
            .map(|docs| docs.iter().map(document_ref).collect())
            .unwrap_or_default();
        log::info!("Found {} documents", found.len());
        Ok(found)
    }

    pub fn document_info(&self, token: &str) -> Result<Option<FileInfo>, DocumentError> {
        let Some(data) = self.store.get(&endpoints::file(token))? else {
            log::warn!("Failed to fetch info for {token}");
            return Ok(None);
        };

        Ok(Some(FileInfo {
            token: text_field(&data, "token"),
            title: text_field(&data, "name"),
            file_type: text_field(&data, "type"),
            url: text_field(&data, "url"),
            created_time: text_field(&data, "created_time"),
            modified_time: text_field(&data, "modified_time"),
            owner: text_field(&data, "owner_id"),
            size: data.get("size").and_then(|v| {
                v.as_u64()
                    .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
            }),
            parent_token: text_field(&data, "parent_token"),
        }))
    }

    pub fn delete_document(&self, token: &str) -> Result<bool, DocumentError> {
        let deleted = self.store.delete(&endpoints::file(token))?.is_some();
        if deleted {
            log::info!("Deleted {token}");
        } else {
            log::warn!("Failed to delete {token}");
        }
        Ok(deleted)
    }

    /// Opens public link access and returns the share URL, if the store
    /// reports one.
    pub fn share_document(
        &self,
        token: &str,
        permission: Permission,
    ) -> Result<Option<String>, DocumentError> {
        let body = encode_body(&ShareBody {
            permission,
            external_access: true,
        })?;

        let url = self
            .store
            .post(&endpoints::public_permission(token), &body)?
            .and_then(|data| text_field(&data, "url"));
        match &url {
            Some(url) => log::info!("Share link for {token}: {url}"),
            None => log::warn!("No share link returned for {token}"),
        }
        Ok(url)
    }
}

fn document_ref(doc: &Value) -> DocumentRef {
    let token = text_field(doc, "docs_token");
    let url = text_field(doc, "url")
        .unwrap_or_else(|| endpoints::document_url(token.as_deref().unwrap_or_default()));
    DocumentRef {
        title: text_field(doc, "title"),
        doc_type: text_field(doc, "docs_type"),
        owner: text_field(doc, "owner_id"),
        token,
        url,
    }
}

/// String field, also accepting numbers (the drive API sends timestamps
/// either way).
fn text_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
