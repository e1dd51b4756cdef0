use std::slice;

use serde::Serialize;
use serde_json::Value;

use crate::parsing::{Table, parse_inline};
use crate::store::{DocumentStore, TransportError, encode_body, endpoints};
use crate::wire::{TextObject, WireBlock, flatten_table};

use super::batch::{BatchWriter, ChildrenBody};

/// What happened to one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TableOutcome {
    /// A real table was created; `filled` of `total` cells received text.
    Filled { filled: usize, total: usize },
    /// Shell creation failed; rows were written as plain text lines instead.
    Degraded { lines: usize, written: usize },
    /// The store accepted the shell request but returned no table block.
    EmptyShell,
    /// Zero rows or zero columns.
    Skipped,
}

impl TableOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TableOutcome::Filled { filled, .. } if *filled > 0)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, TableOutcome::Degraded { .. })
    }
}

/// Two-phase table writer: create an empty shell, then fill each cell.
pub struct TableBuilder<'w, 's, S: DocumentStore + ?Sized> {
    writer: &'w BatchWriter<'s, S>,
}

impl<'w, 's, S: DocumentStore + ?Sized> TableBuilder<'w, 's, S> {
    pub fn new(writer: &'w BatchWriter<'s, S>) -> Self {
        Self { writer }
    }

    pub fn build(&self, table: &Table) -> Result<TableOutcome, TransportError> {
        let rows = table.row_count();
        let cols = table.col_count();
        if rows == 0 || cols == 0 {
            log::warn!("Skipping empty table");
            return Ok(TableOutcome::Skipped);
        }

        log::info!("Creating table: {rows} rows x {cols} columns");
        let shell = WireBlock::table_shell(rows, cols);
        let body = encode_body(&ChildrenBody::append(slice::from_ref(&shell)))?;
        let endpoint = endpoints::children(self.writer.document_id(), self.writer.parent_id());

        let Some(data) = self.writer.store().post(&endpoint, &body)? else {
            log::warn!("Failed to create table, writing rows as text");
            return self.degrade(table);
        };

        let Some(created) = data
            .get("children")
            .and_then(Value::as_array)
            .and_then(|children| children.first())
        else {
            log::warn!("Table creation returned no blocks");
            return Ok(TableOutcome::EmptyShell);
        };

        let cell_ids: Vec<&str> = created
            .pointer("/table/cells")
            .and_then(Value::as_array)
            .map(|cells| cells.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let total = rows * cols;
        if cell_ids.len() < total {
            log::warn!(
                "Table has fewer cells than expected: {} of {total}",
                cell_ids.len()
            );
        }

        let filled = self.fill(table, cols, &cell_ids)?;
        log::info!("Filled {filled}/{total} table cells");
        Ok(TableOutcome::Filled { filled, total })
    }

    /// Fills cells row-major, stopping once cell ids run out.
    fn fill(&self, table: &Table, cols: usize, cell_ids: &[&str]) -> Result<usize, TransportError> {
        let mut filled = 0;

        'rows: for (r, row) in table.all_rows().enumerate() {
            for (c, text) in row.iter().take(cols).enumerate() {
                let Some(cell_id) = cell_ids.get(r * cols + c) else {
                    break 'rows;
                };
                let cell = WireBlock::text(TextObject::from(&parse_inline(text)));
                let body = encode_body(&ChildrenBody::append(slice::from_ref(&cell)))?;
                let endpoint = endpoints::children(self.writer.document_id(), cell_id);
                if self.writer.store().post(&endpoint, &body)?.is_some() {
                    filled += 1;
                }
            }
        }

        Ok(filled)
    }

    fn degrade(&self, table: &Table) -> Result<TableOutcome, TransportError> {
        let lines = flatten_table(table);
        let tally = self.writer.write_chunks(&lines)?;
        Ok(TableOutcome::Degraded {
            lines: lines.len(),
            written: tally.ok,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Method, RecordingStore, Reply};
    use crate::wire::block_type;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn three_by_three() -> Table {
        Table {
            headers: strings(&["a", "b", "c"]),
            rows: vec![strings(&["1", "2", "3"]), strings(&["4", "5", "6"])],
        }
    }

    fn is_shell(body: &Value) -> bool {
        body["children"][0]["block_type"] == json!(block_type::TABLE)
    }

    #[test]
    fn fills_every_cell_in_row_major_order() {
        let store = RecordingStore::new();
        let writer = BatchWriter::new(&store, "doc", "doc", 50);
        let outcome = TableBuilder::new(&writer).build(&three_by_three()).unwrap();

        assert_eq!(outcome, TableOutcome::Filled { filled: 9, total: 9 });
        let requests = store.requests();
        assert_eq!(requests.len(), 10);
        assert_eq!(
            requests[0].body.as_ref().unwrap()["children"][0]["table"]["property"],
            json!({"row_size": 3, "column_size": 3})
        );
        let contents: Vec<Value> = requests[1..]
            .iter()
            .map(|r| r.body.as_ref().unwrap()["children"][0]["text"]["elements"][0]["text_run"]["content"].clone())
            .collect();
        assert_eq!(
            contents,
            ["a", "b", "c", "1", "2", "3", "4", "5", "6"].map(Value::from).to_vec()
        );
    }

    #[test]
    fn cells_are_posted_to_their_own_ids() {
        let store = RecordingStore::with_responder(|request| match &request.body {
            Some(body) if is_shell(body) => Reply::Respond(json!({
                "children": [{"table": {"cells": ["c1", "c2"]}}]
            })),
            _ => Reply::Simulate,
        });
        let writer = BatchWriter::new(&store, "doc", "doc", 50);
        let table = Table {
            headers: strings(&["x", "y"]),
            rows: vec![],
        };
        TableBuilder::new(&writer).build(&table).unwrap();

        let paths: Vec<String> = store.requests()[1..]
            .iter()
            .map(|r| r.endpoint.clone())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/docx/v1/documents/doc/blocks/c1/children",
                "/docx/v1/documents/doc/blocks/c2/children"
            ]
        );
    }

    #[test]
    fn short_cell_array_underfills_without_error() {
        let store = RecordingStore::with_responder(|request| match &request.body {
            Some(body) if is_shell(body) => Reply::Respond(json!({
                "children": [{"table": {"cells": ["c1", "c2", "c3", "c4"]}}]
            })),
            _ => Reply::Simulate,
        });
        let writer = BatchWriter::new(&store, "doc", "doc", 50);
        let outcome = TableBuilder::new(&writer).build(&three_by_three()).unwrap();

        assert_eq!(outcome, TableOutcome::Filled { filled: 4, total: 9 });
        assert!(outcome.is_success());
        assert_eq!(store.request_count(), 5);
    }

    #[test]
    fn shell_failure_degrades_to_text_lines() {
        let store = RecordingStore::with_responder(|request| match &request.body {
            Some(body) if is_shell(body) => Reply::Fail,
            _ => Reply::Simulate,
        });
        let writer = BatchWriter::new(&store, "doc", "doc", 50);
        let outcome = TableBuilder::new(&writer).build(&three_by_three()).unwrap();

        assert_eq!(outcome, TableOutcome::Degraded { lines: 3, written: 3 });
        assert!(!outcome.is_success());
        assert!(outcome.is_degraded());

        let requests = store.requests();
        let fallback = &requests[1];
        assert_eq!(fallback.child_count(), 3);
        assert_eq!(
            fallback.body.as_ref().unwrap()["children"][1]["text"]["elements"][0]["text_run"]["content"],
            "1 | 2 | 3"
        );
        assert_eq!(writer.tally().total, 0);
    }

    #[test]
    fn empty_shell_response_is_distinct_failure() {
        let store = RecordingStore::with_responder(|_| Reply::Respond(json!({"children": []})));
        let writer = BatchWriter::new(&store, "doc", "doc", 50);
        let outcome = TableBuilder::new(&writer).build(&three_by_three()).unwrap();

        assert_eq!(outcome, TableOutcome::EmptyShell);
        assert_eq!(store.request_count(), 1);
    }

    #[test]
    fn empty_table_is_skipped_without_requests() {
        let store = RecordingStore::new();
        let writer = BatchWriter::new(&store, "doc", "doc", 50);
        let outcome = TableBuilder::new(&writer).build(&Table::default()).unwrap();

        assert_eq!(outcome, TableOutcome::Skipped);
        assert_eq!(store.request_count(), 0);
    }

    #[test]
    fn overlong_rows_are_bounded_to_column_count() {
        let store = RecordingStore::new();
        let writer = BatchWriter::new(&store, "doc", "doc", 50);
        let table = Table {
            headers: strings(&["a", "b"]),
            rows: vec![strings(&["1", "2", "3"])],
        };
        let outcome = TableBuilder::new(&writer).build(&table).unwrap();

        assert_eq!(outcome, TableOutcome::Filled { filled: 4, total: 4 });
        assert!(store.requests().iter().all(|r| r.method == Method::Post));
    }

    #[test]
    fn cell_text_is_inline_parsed() {
        let store = RecordingStore::new();
        let writer = BatchWriter::new(&store, "doc", "doc", 50);
        let table = Table {
            headers: strings(&["**h**"]),
            rows: vec![],
        };
        TableBuilder::new(&writer).build(&table).unwrap();

        assert_eq!(
            store.requests()[1].body.as_ref().unwrap()["children"][0]["text"]["elements"][0],
            json!({"text_run": {"content": "h", "text_element_style": {"bold": true}}})
        );
    }
}
