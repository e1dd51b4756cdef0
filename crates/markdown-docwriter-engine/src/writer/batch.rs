use std::ops::AddAssign;

use serde::Serialize;
use serde_json::Value;

use crate::store::{DocumentStore, TransportError, encode_body, endpoints};
use crate::wire::WireBlock;

/// Wire blocks per children-insertion request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Running `ok / total` block counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteTally {
    pub ok: usize,
    pub total: usize,
}

impl AddAssign for WriteTally {
    fn add_assign(&mut self, other: Self) {
        self.ok += other.ok;
        self.total += other.total;
    }
}

/// Body of a children-insertion request; `index: -1` appends at the end.
#[derive(Debug, Serialize)]
pub(crate) struct ChildrenBody<'a> {
    children: &'a [WireBlock],
    index: i32,
}

impl<'a> ChildrenBody<'a> {
    pub(crate) fn append(children: &'a [WireBlock]) -> Self {
        Self {
            children,
            index: -1,
        }
    }
}

/// Wire blocks waiting for the next flush. Owned by one [`BatchWriter`].
#[derive(Debug, Default)]
pub struct PendingBuffer {
    blocks: Vec<WireBlock>,
}

impl PendingBuffer {
    pub fn push(&mut self, block: WireBlock) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Empties the buffer, handing back everything it held.
    pub fn take(&mut self) -> Vec<WireBlock> {
        std::mem::take(&mut self.blocks)
    }
}

/// Appends wire blocks under one parent node in order, in bounded chunks.
///
/// Blocks accumulate in a [`PendingBuffer`] that is flushed whenever it
/// reaches `batch_size`, before each table and on [`finish`](Self::finish).
/// A rejected chunk counts zero successes and writing carries on.
pub struct BatchWriter<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    document_id: String,
    parent_id: String,
    batch_size: usize,
    buffer: PendingBuffer,
    tally: WriteTally,
}

impl<'s, S: DocumentStore + ?Sized> BatchWriter<'s, S> {
    pub fn new(store: &'s S, document_id: &str, parent_id: &str, batch_size: usize) -> Self {
        Self {
            store,
            document_id: document_id.to_string(),
            parent_id: parent_id.to_string(),
            batch_size: batch_size.max(1),
            buffer: PendingBuffer::default(),
            tally: WriteTally::default(),
        }
    }

    pub fn store(&self) -> &'s S {
        self.store
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn tally(&self) -> WriteTally {
        self.tally
    }

    pub fn push(&mut self, block: WireBlock) -> Result<(), TransportError> {
        self.buffer.push(block);
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    pub fn extend(
        &mut self,
        blocks: impl IntoIterator<Item = WireBlock>,
    ) -> Result<(), TransportError> {
        for block in blocks {
            self.push(block)?;
        }
        Ok(())
    }

    /// Writes everything pending and adds the result to the running totals.
    pub fn flush(&mut self) -> Result<(), TransportError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let blocks = self.buffer.take();
        let tally = self.write_chunks(&blocks)?;
        self.tally += tally;
        Ok(())
    }

    /// Writes `blocks` as one request per chunk without touching the
    /// running totals.
    pub fn write_chunks(&self, blocks: &[WireBlock]) -> Result<WriteTally, TransportError> {
        let endpoint = endpoints::children(&self.document_id, &self.parent_id);
        let mut tally = WriteTally::default();

        for chunk in blocks.chunks(self.batch_size) {
            let body = encode_body(&ChildrenBody::append(chunk))?;
            match self.store.post(&endpoint, &body)? {
                Some(data) => tally.ok += accepted_count(&data, chunk.len()),
                None => log::warn!("Failed to write {} blocks", chunk.len()),
            }
            tally.total += chunk.len();
        }

        Ok(tally)
    }

    /// Counts one block written outside the buffer, such as a table.
    pub fn record(&mut self, ok: bool) {
        self.tally += WriteTally {
            ok: usize::from(ok),
            total: 1,
        };
    }

    pub fn finish(mut self) -> Result<WriteTally, TransportError> {
        self.flush()?;
        Ok(self.tally)
    }
}

/// Children the store reports as created, or the whole chunk when it
/// reports none.
fn accepted_count(data: &Value, chunk_len: usize) -> usize {
    match data.get("children").and_then(Value::as_array) {
        Some(children) if !children.is_empty() => children.len().min(chunk_len),
        _ => chunk_len,
    }
}
