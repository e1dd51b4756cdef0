pub mod documents;
pub mod parsing;
pub mod store;
pub mod wire;
pub mod writer;

// Re-export key types for easier usage
pub use documents::{
    DocumentClient, DocumentError, DocumentInfo, DocumentRef, FileInfo, ParsePermissionError,
    Permission,
};
pub use parsing::{Block, RichText, ScanOptions, Span, SpanStyle, Table, parse_document, parse_document_with, parse_inline};
pub use store::{DocumentStore, RecordedRequest, RecordingStore, Reply, TransportError};
pub use wire::{WireBlock, flatten_table, translate};
pub use writer::{DocumentWriter, TableOutcome, WriteError, WriteSummary, WriterOptions};
