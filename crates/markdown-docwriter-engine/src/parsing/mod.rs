pub mod blocks;
pub mod inline;

pub use blocks::{Block, ScanOptions, Table};
pub use inline::{RichText, Span, SpanStyle, parse_inline};

use blocks::BlockScanner;

/// Scans markdown-ish text into blocks with the default policy.
pub fn parse_document(text: &str) -> Vec<Block> {
    parse_document_with(text, ScanOptions::default())
}

pub fn parse_document_with(text: &str, options: ScanOptions) -> Vec<Block> {
    BlockScanner::new(text, options).scan()
}
