//! # Wire Blocks
//!
//! The remote store's JSON block representation and the translation from
//! scanned [`Block`](crate::parsing::Block)s into it.
//!
//! A wire block serializes as `{"block_type": <code>, "<field>": <content>}`
//! where the field name depends on the kind (`text`, `heading2`, `bullet`,
//! `table`, ...).

pub mod translate;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::parsing::{RichText, SpanStyle};

pub use translate::{flatten_table, translate};

/// Block type codes assigned by the remote store.
pub mod block_type {
    pub const TEXT: u8 = 2;
    /// `HEADING_BASE + level` gives heading1 = 3 through heading6 = 8.
    pub const HEADING_BASE: u8 = 2;
    pub const BULLET: u8 = 12;
    pub const ORDERED: u8 = 13;
    pub const CODE: u8 = 14;
    pub const QUOTE: u8 = 15;
    pub const DIVIDER: u8 = 22;
    pub const TABLE: u8 = 31;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    Text,
    Heading(u8),
    Bullet,
    Ordered,
    Code,
    Quote,
    Divider,
    Table,
}

impl WireKind {
    pub fn block_type(self) -> u8 {
        match self {
            WireKind::Text => block_type::TEXT,
            WireKind::Heading(level) => block_type::HEADING_BASE + level,
            WireKind::Bullet => block_type::BULLET,
            WireKind::Ordered => block_type::ORDERED,
            WireKind::Code => block_type::CODE,
            WireKind::Quote => block_type::QUOTE,
            WireKind::Divider => block_type::DIVIDER,
            WireKind::Table => block_type::TABLE,
        }
    }

    /// JSON field holding the block's content.
    pub fn field(self) -> String {
        match self {
            WireKind::Text => "text".to_string(),
            WireKind::Heading(level) => format!("heading{level}"),
            WireKind::Bullet => "bullet".to_string(),
            WireKind::Ordered => "ordered".to_string(),
            WireKind::Code => "code".to_string(),
            WireKind::Quote => "quote".to_string(),
            WireKind::Divider => "divider".to_string(),
            WireKind::Table => "table".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireContent {
    Text(TextObject),
    Table(TableShell),
    Empty(EmptyObject),
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmptyObject {}

/// One block in the remote store's wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct WireBlock {
    pub kind: WireKind,
    pub content: WireContent,
}

impl WireBlock {
    pub fn text(text: TextObject) -> Self {
        Self::with_text(WireKind::Text, text)
    }

    /// Heading levels outside 1..=6 are clamped.
    pub fn heading(level: u8, text: TextObject) -> Self {
        Self::with_text(WireKind::Heading(level.clamp(1, 6)), text)
    }

    pub fn with_text(kind: WireKind, text: TextObject) -> Self {
        Self {
            kind,
            content: WireContent::Text(text),
        }
    }

    pub fn divider() -> Self {
        Self {
            kind: WireKind::Divider,
            content: WireContent::Empty(EmptyObject {}),
        }
    }

    /// An empty table shell of `rows × columns` cells.
    pub fn table_shell(rows: usize, columns: usize) -> Self {
        Self {
            kind: WireKind::Table,
            content: WireContent::Table(TableShell {
                property: TableProperty {
                    row_size: rows,
                    column_size: columns,
                },
            }),
        }
    }

    pub fn block_type(&self) -> u8 {
        self.kind.block_type()
    }
}

impl Serialize for WireBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("block_type", &self.block_type())?;
        map.serialize_entry(&self.kind.field(), &self.content)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableShell {
    pub property: TableProperty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableProperty {
    pub row_size: usize,
    pub column_size: usize,
}

/// Rich text container: `{"elements": [{"text_run": ...}, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextObject {
    pub elements: Vec<TextElement>,
}

impl TextObject {
    /// A single unstyled run.
    pub fn plain(content: &str) -> Self {
        Self {
            elements: vec![TextElement::run(content, TextElementStyle::default())],
        }
    }
}

impl From<&RichText> for TextObject {
    fn from(text: &RichText) -> Self {
        Self {
            elements: text
                .spans()
                .iter()
                .map(|span| TextElement::run(&span.content, TextElementStyle::from(&span.style)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextElement {
    pub text_run: TextRun,
}

impl TextElement {
    pub fn run(content: &str, style: TextElementStyle) -> Self {
        Self {
            text_run: TextRun {
                content: content.to_string(),
                text_element_style: style,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub content: String,
    #[serde(skip_serializing_if = "TextElementStyle::is_plain")]
    pub text_element_style: TextElementStyle,
}

/// Per-run styling flags; plain runs omit the style entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TextElementStyle {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub inline_code: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<LinkTarget>,
}

impl TextElementStyle {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&SpanStyle> for TextElementStyle {
    fn from(style: &SpanStyle) -> Self {
        let mut out = Self::default();
        match style {
            SpanStyle::Plain => {}
            SpanStyle::Bold => out.bold = true,
            SpanStyle::Italic => out.italic = true,
            SpanStyle::BoldItalic => {
                out.bold = true;
                out.italic = true;
            }
            SpanStyle::Code => out.inline_code = true,
            SpanStyle::Strikethrough => out.strikethrough = true,
            SpanStyle::Link { url } => out.link = Some(LinkTarget { url: url.clone() }),
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTarget {
    pub url: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}
