//! # Document Writer
//!
//! Drives one conversion: scan the text, translate each block and append
//! the results to a document in order.
//!
//! ## Modules
//!
//! - **`batch`**: `BatchWriter` owns the pending buffer and writes it in chunks
//! - **`table`**: `TableBuilder` runs the two-phase shell-then-cells protocol
//!
//! Ordinary blocks are buffered. Before each table the buffer is flushed so
//! the table lands after the text that precedes it. No single failure stops
//! the conversion; only a [`TransportError`] does.

pub mod batch;
pub mod table;

use serde::Serialize;

use crate::parsing::{Block, ScanOptions, parse_document_with};
use crate::store::{DocumentStore, TransportError};
use crate::wire::translate;

pub use batch::{BatchWriter, DEFAULT_BATCH_SIZE, PendingBuffer, WriteTally};
pub use table::{TableBuilder, TableOutcome};

/// A write succeeds overall when strictly more than this share of the
/// attempted blocks succeeded.
pub const SUCCESS_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    pub batch_size: usize,
    pub scan: ScanOptions,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            scan: ScanOptions::default(),
        }
    }
}

/// Result of one conversion. Each table counts as a single block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub tables: Vec<TableOutcome>,
}

impl WriteSummary {
    pub fn ratio(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted as f64
        }
    }

    pub fn is_success(&self) -> bool {
        self.attempted > 0 && self.ratio() > SUCCESS_THRESHOLD
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("No content to write")]
    Empty,
}

pub struct DocumentWriter<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    options: WriterOptions,
}

impl<'s, S: DocumentStore + ?Sized> DocumentWriter<'s, S> {
    pub fn new(store: &'s S, options: WriterOptions) -> Self {
        Self { store, options }
    }

    /// Appends `text` to the end of `document_id`'s root block.
    pub fn write(&self, document_id: &str, text: &str) -> Result<WriteSummary, WriteError> {
        let blocks = parse_document_with(text, self.options.scan);
        if blocks.is_empty() {
            log::warn!("No content to write to {document_id}");
            return Err(WriteError::Empty);
        }

        log::info!("Writing {} blocks to {document_id}", blocks.len());
        // the document id doubles as its root block id
        let mut writer = BatchWriter::new(self.store, document_id, document_id, self.options.batch_size);
        let mut tables = vec![];

        for block in &blocks {
            match block {
                Block::Table(table) => {
                    writer.flush()?;
                    let outcome = TableBuilder::new(&writer).build(table)?;
                    writer.record(outcome.is_success());
                    tables.push(outcome);
                }
                other => writer.extend(translate(other))?,
            }
        }

        let tally = writer.finish()?;
        let summary = WriteSummary {
            attempted: tally.total,
            succeeded: tally.ok,
            tables,
        };

        if summary.is_success() {
            log::info!(
                "Content written: {}/{} blocks succeeded",
                summary.succeeded,
                summary.attempted
            );
        } else {
            log::warn!(
                "Content write partially failed: {}/{} blocks succeeded",
                summary.succeeded,
                summary.attempted
            );
        }
        Ok(summary)
    }
}
