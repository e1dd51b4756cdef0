//! # Inline Parsing
//!
//! Cursor-based inline parsing that turns one line of text into styled runs.
//!
//! ## Architecture
//!
//! Inline parsing is separate from block scanning and runs over the text of
//! every text-bearing block (paragraphs, headings, list items, quotes, table
//! cells). Code blocks are never inline-parsed.
//!
//! The parser makes a single left-to-right pass. At each position it tries
//! every construct in priority order; the first one that matches consumes its
//! whole span atomically. Constructs never nest.
//!
//! ## Modules
//!
//! - **`types`**: `Span`, `SpanStyle` and `RichText`
//! - **`kinds`**: Inline-specific types with owned delimiters (Emphasis, CodeSpan, Strikethrough, Link)
//! - **`cursor`**: `Cursor` for byte-wise scanning with backtracking
//! - **`parser`**: `parse_inline()` main entry point with `try_parse_*` helpers
//!
//! ## Precedence
//!
//! `***bold italic***` > `**bold**` > `*italic*` > `` `code` `` > `~~strike~~` > `[text](url)`.
//! The earliest match position wins first; priority only breaks ties at the
//! same position.

pub mod cursor;
pub mod kinds;
pub mod parser;
pub mod types;

pub use parser::parse_inline;
pub use types::{RichText, Span, SpanStyle};
