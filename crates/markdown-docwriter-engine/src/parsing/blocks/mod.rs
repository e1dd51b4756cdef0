//! # Block Scanning
//!
//! Two-phase block scanning over lines.
//!
//! ## Phases
//!
//! 1. **Line Classification** (`classify`): Each line is classified into a `LineClass`
//!    containing local facts (blank, heading, list markers, fence, quote, pipes)
//!
//! 2. **Block Construction** (`scanner`): A `BlockScanner` walks the classified lines
//!    once, using read-only lookahead to group multi-line constructs into `Block`s
//!
//! ## Modules
//!
//! - **`types`**: Core types (`Block`, `Table`)
//! - **`kinds`**: Block-specific types with owned delimiters (Heading, Divider, lists, CodeFence, BlockQuote, TableRow)
//! - **`classify`**: `MarkdownLineClassifier` produces `LineClass` for each line
//! - **`scanner`**: `BlockScanner` cursor and the `ScanOptions` policy knobs
//!
//! ## Dispatch Order
//!
//! blank → heading → divider → bullet list → ordered list → code fence →
//! quote → table → paragraph. The first rule that matches wins.
//!
//! ## Ambiguity Rules
//!
//! - `6. Risk` is a section paragraph, not a list: a run only becomes an
//!   ordered list when its first number is at most `ordered_list_max_start`
//! - Multi-level numbers (`6.1 Macro`, `1.2. Scope`) never start or
//!   continue a list while `detect_subsections` is on
//! - A pipe line is a table only when the next line is a separator and at
//!   least one data row follows
//! - An unclosed code fence is an ordinary paragraph line

pub mod classify;
pub mod kinds;
pub mod scanner;
pub mod types;

pub use classify::{LineClass, MarkdownLineClassifier};
pub use scanner::{BlockScanner, DEFAULT_ORDERED_LIST_MAX_START, ScanOptions};
pub use types::{Block, Table};
