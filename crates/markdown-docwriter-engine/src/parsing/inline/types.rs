use serde::Serialize;

/// Style applied to one run of inline text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum SpanStyle {
    Plain,
    Bold,
    Italic,
    BoldItalic,
    Code,
    Strikethrough,
    /// A hyperlink; the span content is the link text.
    Link { url: String },
}

/// A styled run of text with its markup delimiters already stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub content: String,
    #[serde(flatten)]
    pub style: SpanStyle,
}

impl Span {
    pub fn new(content: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            content: content.into(),
            style,
        }
    }

    pub fn plain(content: impl Into<String>) -> Self {
        Self::new(content, SpanStyle::Plain)
    }
}

/// An ordered sequence of spans.
///
/// Concatenating every span's `content` reproduces the source line with the
/// markup delimiters removed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Span>);

impl RichText {
    pub fn spans(&self) -> &[Span] {
        &self.0
    }

    /// The visible text with all styling dropped.
    pub fn plain_text(&self) -> String {
        self.0.iter().map(|s| s.content.as_str()).collect()
    }

    /// True when no run carries any styling.
    pub fn is_plain(&self) -> bool {
        self.0.iter().all(|s| s.style == SpanStyle::Plain)
    }
}

impl From<Vec<Span>> for RichText {
    fn from(spans: Vec<Span>) -> Self {
        Self(spans)
    }
}
