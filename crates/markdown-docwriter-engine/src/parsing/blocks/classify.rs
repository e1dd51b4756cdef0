use super::kinds::{
    BlockQuote, BulletList, CodeFence, Divider, Heading, OrderedItem, OrderedList, TableRow,
};

/// Classification of a single line containing only local facts.
///
/// This is phase 1 of block scanning: each line is classified independently
/// without reference to surrounding context. The scanner combines these
/// facts with lookahead.
#[derive(Debug, Clone, Copy)]
pub struct LineClass<'a> {
    /// The line as written, minus a trailing `\r`. Code blocks keep this.
    pub raw: &'a str,
    /// The line with trailing whitespace trimmed. Everything else matches on this.
    pub text: &'a str,
    pub is_blank: bool,
    pub heading: Option<(u8, &'a str)>,
    pub is_divider: bool,
    pub bullet: Option<&'a str>,
    pub ordered: Option<OrderedItem<'a>>,
    /// Looks like a multi-level section number (`6.1 ...`).
    pub is_subsection: bool,
    /// Language tag if the line opens a code fence.
    pub fence_open: Option<&'a str>,
    pub is_fence_close: bool,
    pub quote: Option<&'a str>,
    pub has_pipe: bool,
    pub is_table_separator: bool,
}

/// Classifies individual lines for the block scanning phase.
pub struct MarkdownLineClassifier;

impl MarkdownLineClassifier {
    /// Classifies a line into a [`LineClass`] containing local facts.
    pub fn classify<'a>(&self, line: &'a str) -> LineClass<'a> {
        let raw = line.strip_suffix('\r').unwrap_or(line);
        let text = raw.trim_end();

        LineClass {
            raw,
            text,
            is_blank: text.is_empty(),
            heading: Heading::parse(text),
            is_divider: Divider::matches(text),
            bullet: BulletList::item(text),
            ordered: OrderedList::item(text),
            is_subsection: OrderedList::is_subsection(text),
            fence_open: CodeFence::open(text),
            is_fence_close: CodeFence::closes(text),
            quote: BlockQuote::strip(text),
            has_pipe: TableRow::has_pipe(text),
            is_table_separator: TableRow::is_separator(text),
        }
    }

    /// Splits `input` on `\n` and classifies every line.
    pub fn classify_all<'a>(&self, input: &'a str) -> Vec<LineClass<'a>> {
        input.split('\n').map(|line| self.classify(line)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriage_return_is_dropped() {
        let lc = MarkdownLineClassifier.classify("# Title\r");
        assert_eq!(lc.raw, "# Title");
        assert_eq!(lc.heading, Some((1, "Title")));
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert!(MarkdownLineClassifier.classify("   \t").is_blank);
    }

    #[test]
    fn raw_keeps_trailing_whitespace() {
        let lc = MarkdownLineClassifier.classify("    indented  ");
        assert_eq!(lc.raw, "    indented  ");
        assert_eq!(lc.text, "    indented");
    }

    #[test]
    fn divider_star_line_is_not_a_bullet() {
        let lc = MarkdownLineClassifier.classify("***");
        assert!(lc.is_divider);
        assert_eq!(lc.bullet, None);
    }

    #[test]
    fn classify_all_keeps_line_count() {
        let lines = MarkdownLineClassifier.classify_all("a\n\nb");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_blank);
    }
}
