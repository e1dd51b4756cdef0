use serde::Serialize;

use crate::parsing::inline::RichText;

/// One typed unit of document structure produced by the block scanner.
///
/// Blocks are transient: built during one conversion, translated, written
/// and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// `# Title` through `###### Title`.
    Heading { level: u8, text: String },
    /// Consecutive plain lines joined with single spaces.
    Paragraph { text: RichText },
    BulletList { items: Vec<String> },
    OrderedList { items: Vec<String> },
    /// A closed code fence; `code` keeps the inner lines verbatim.
    CodeBlock { language: String, code: String },
    /// Consecutive `> ` lines, newline-joined with the prefix stripped.
    Quote { text: String },
    Divider,
    Table(Table),
}

/// A pipe table with an optional header row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Header row (when present) plus every data row.
    pub fn row_count(&self) -> usize {
        usize::from(!self.headers.is_empty()) + self.rows.len()
    }

    /// Width of the header, or of the first data row for header-less tables.
    pub fn col_count(&self) -> usize {
        if self.headers.is_empty() {
            self.rows.first().map_or(0, Vec::len)
        } else {
            self.headers.len()
        }
    }

    /// Logical rows in order: `[headers] + rows`, omitting an empty header.
    pub fn all_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        std::iter::once(&self.headers)
            .filter(|h| !h.is_empty())
            .chain(self.rows.iter())
    }

    /// Each logical row rendered as a ` | `-joined line.
    pub fn flattened_lines(&self) -> Vec<String> {
        self.all_rows().map(|row| row.join(" | ")).collect()
    }
}
