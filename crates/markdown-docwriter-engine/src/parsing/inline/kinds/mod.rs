//! # Inline Kinds
//!
//! Inline-specific types that own their syntax delimiters.
//!
//! ## Types
//!
//! - **`Emphasis`**: `BOLD_ITALIC = b"***"`, `BOLD = b"**"`, `ITALIC = b"*"`
//! - **`CodeSpan`**: `TICK = b"\`"`
//! - **`Strikethrough`**: `TILDES = b"~~"`
//! - **`Link`**: `[text](url)` brackets
//!
//! The parser calls these constants; it never hardcodes `**` or `` ` ``.

pub mod code_span;
pub mod emphasis;
pub mod link;
pub mod strikethrough;

pub use code_span::CodeSpan;
pub use emphasis::Emphasis;
pub use link::Link;
pub use strikethrough::Strikethrough;
