use serde::{Deserialize, Serialize};

use crate::parsing::inline::parse_inline;

use super::{
    classify::{LineClass, MarkdownLineClassifier},
    kinds::{OrderedItem, TableRow},
    types::{Block, Table},
};

/// Highest leading number that may start an ordered list.
///
/// `1. Intro` starts a list; `6. Risk` is assumed to be a numbered section
/// heading and stays a paragraph. Short documents whose first list item is
/// numbered above this are misclassified.
pub const DEFAULT_ORDERED_LIST_MAX_START: u64 = 3;

/// Policy knobs for the ambiguous constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub ordered_list_max_start: u64,
    /// Treat multi-level numbers (`1.2. Scope`, `6.1 Macro`) as section
    /// numbers. When off, `1.2. Scope` is an ordered item numbered 1.
    pub detect_subsections: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ordered_list_max_start: DEFAULT_ORDERED_LIST_MAX_START,
            detect_subsections: true,
        }
    }
}

/// Forward-only cursor over classified lines.
///
/// Each call to `step` consumes at least one line and never revisits a
/// consumed line; lookahead is read-only.
pub struct BlockScanner<'a> {
    lines: Vec<LineClass<'a>>,
    pos: usize,
    options: ScanOptions,
    out: Vec<Block>,
}

impl<'a> BlockScanner<'a> {
    pub fn new(input: &'a str, options: ScanOptions) -> Self {
        Self {
            lines: MarkdownLineClassifier.classify_all(input),
            pos: 0,
            options,
            out: vec![],
        }
    }

    pub fn scan(mut self) -> Vec<Block> {
        while self.pos < self.lines.len() {
            self.step();
        }
        self.out
    }

    fn step(&mut self) {
        let line = self.lines[self.pos];

        if line.is_blank {
            self.pos += 1;
            return;
        }

        if let Some((level, text)) = line.heading {
            self.emit(
                Block::Heading {
                    level,
                    text: text.to_string(),
                },
                1,
            );
            return;
        }

        if line.is_divider {
            self.emit(Block::Divider, 1);
            return;
        }

        if line.bullet.is_some() {
            let items = self.take_run(|l| l.bullet);
            self.out.push(Block::BulletList { items });
            return;
        }

        if self.starts_ordered_list(&line) {
            let detect = self.options.detect_subsections;
            let items = self.take_run(|l| ordered_item(l, detect).map(|o| o.text));
            self.out.push(Block::OrderedList { items });
            return;
        }

        if let Some(language) = line.fence_open {
            match self.closing_fence(self.pos) {
                Some(close) => {
                    let code = self.lines[self.pos + 1..close]
                        .iter()
                        .map(|l| l.raw)
                        .collect::<Vec<_>>()
                        .join("\n");
                    let consumed = close + 1 - self.pos;
                    self.emit(
                        Block::CodeBlock {
                            language: language.to_string(),
                            code,
                        },
                        consumed,
                    );
                }
                None => {
                    // unterminated fence: the opener is an ordinary line
                    self.emit(
                        Block::Paragraph {
                            text: parse_inline(line.text),
                        },
                        1,
                    );
                }
            }
            return;
        }

        if line.quote.is_some() {
            let text = self.take_run(|l| l.quote).join("\n");
            self.out.push(Block::Quote { text });
            return;
        }

        if let Some(end) = self.table_end(self.pos) {
            self.take_table(end);
            return;
        }

        self.take_paragraph();
    }

    fn emit(&mut self, block: Block, consumed: usize) {
        self.out.push(block);
        self.pos += consumed;
    }

    /// Consumes the longest run of lines starting at `pos` for which `item`
    /// yields text.
    fn take_run(&mut self, item: impl Fn(&LineClass<'a>) -> Option<&'a str>) -> Vec<String> {
        let mut items = vec![];
        while let Some(text) = self.lines.get(self.pos).and_then(&item) {
            items.push(text.to_string());
            self.pos += 1;
        }
        items
    }

    /// Only a low first number starts a list; later items may be any number.
    fn starts_ordered_list(&self, line: &LineClass<'_>) -> bool {
        ordered_item(line, self.options.detect_subsections)
            .and_then(|item| item.number)
            .is_some_and(|n| n <= self.options.ordered_list_max_start)
    }

    fn closing_fence(&self, open: usize) -> Option<usize> {
        self.lines
            .iter()
            .enumerate()
            .skip(open + 1)
            .find(|(_, l)| l.is_fence_close)
            .map(|(i, _)| i)
    }

    /// End (exclusive) of the table starting at line `i`: a pipe line with
    /// at least one cell, a separator, then at least one data row with
    /// cells. A header and separator alone are not a table.
    fn table_end(&self, i: usize) -> Option<usize> {
        let line = &self.lines[i];
        let opens = line.has_pipe
            && !line.is_table_separator
            && !TableRow::cells(line.text).is_empty()
            && self
                .lines
                .get(i + 1)
                .is_some_and(|next| next.is_table_separator);
        if !opens {
            return None;
        }

        let end = self.lines[i + 2..]
            .iter()
            .position(|l| !l.has_pipe || l.is_table_separator)
            .map_or(self.lines.len(), |n| i + 2 + n);
        self.lines[i + 2..end]
            .iter()
            .any(|l| !TableRow::cells(l.text).is_empty())
            .then_some(end)
    }

    fn take_table(&mut self, end: usize) {
        let headers = TableRow::cells(self.lines[self.pos].text);
        let rows = self.lines[self.pos + 2..end]
            .iter()
            .map(|l| TableRow::cells(l.text))
            .filter(|cells| !cells.is_empty())
            .collect();
        self.pos = end;

        self.out.push(Block::Table(Table { headers, rows }));
    }

    /// True when line `i` would be consumed by anything other than the
    /// paragraph fallback. Section-style numbered lines do not count.
    fn opens_block(&self, i: usize) -> bool {
        let line = &self.lines[i];
        line.heading.is_some()
            || line.is_divider
            || line.bullet.is_some()
            || self.starts_ordered_list(line)
            || (line.fence_open.is_some() && self.closing_fence(i).is_some())
            || line.quote.is_some()
            || self.table_end(i).is_some()
    }

    fn take_paragraph(&mut self) {
        let mut parts = vec![self.lines[self.pos].text];
        self.pos += 1;

        while self.pos < self.lines.len() {
            let line = &self.lines[self.pos];
            if line.is_blank || self.opens_block(self.pos) {
                break;
            }
            parts.push(line.text.trim());
            self.pos += 1;
        }

        self.out.push(Block::Paragraph {
            text: parse_inline(&parts.join(" ")),
        });
    }
}

/// The line's ordered item, unless it is a subsection number and those are
/// being detected.
fn ordered_item<'a>(line: &LineClass<'a>, detect_subsections: bool) -> Option<OrderedItem<'a>> {
    if detect_subsections && line.is_subsection {
        return None;
    }
    line.ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::inline::{Span, SpanStyle};
    use pretty_assertions::assert_eq;

    fn scan(input: &str) -> Vec<Block> {
        BlockScanner::new(input, ScanOptions::default()).scan()
    }

    fn para(text: &str) -> Block {
        Block::Paragraph {
            text: parse_inline(text),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn heading_then_paragraph() {
        assert_eq!(
            scan("# Title\n\nHello world"),
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                para("Hello world"),
            ]
        );
    }

    #[test]
    fn blank_lines_emit_nothing() {
        assert_eq!(scan("\n\n   \n"), vec![]);
    }

    #[test]
    fn bullet_run_is_one_block() {
        assert_eq!(
            scan("- a\n* b\n+ c"),
            vec![Block::BulletList {
                items: strings(&["a", "b", "c"])
            }]
        );
    }

    #[test]
    fn blank_line_splits_lists() {
        assert_eq!(
            scan("- a\n\n- b"),
            vec![
                Block::BulletList {
                    items: strings(&["a"])
                },
                Block::BulletList {
                    items: strings(&["b"])
                },
            ]
        );
    }

    #[test]
    fn ordered_list_low_start() {
        assert_eq!(
            scan("1. x\n2. y"),
            vec![Block::OrderedList {
                items: strings(&["x", "y"])
            }]
        );
    }

    #[test]
    fn ordered_list_continues_with_any_number() {
        assert_eq!(
            scan("3. c\n4. d\n10. j"),
            vec![Block::OrderedList {
                items: strings(&["c", "d", "j"])
            }]
        );
    }

    #[test]
    fn high_number_is_section_paragraph() {
        assert_eq!(scan("6. Deep dive"), vec![para("6. Deep dive")]);
    }

    #[test]
    fn consecutive_section_numbers_join_one_paragraph() {
        assert_eq!(scan("6. Risk\n7. Outlook"), vec![para("6. Risk 7. Outlook")]);
    }

    #[test]
    fn low_numbered_line_still_breaks_a_paragraph() {
        assert_eq!(
            scan("6. Risk\n1. Vendors"),
            vec![
                para("6. Risk"),
                Block::OrderedList {
                    items: strings(&["Vendors"])
                },
            ]
        );
    }

    #[test]
    fn subsection_numbers_are_paragraphs_by_default() {
        assert_eq!(
            scan("1.1. Intro\n1.2. Scope"),
            vec![para("1.1. Intro 1.2. Scope")]
        );
        assert_eq!(
            scan("1. Goals\n1.1. Detail"),
            vec![
                Block::OrderedList {
                    items: strings(&["Goals"])
                },
                para("1.1. Detail"),
            ]
        );
    }

    #[test]
    fn subsection_detection_can_be_switched_off() {
        let options = ScanOptions {
            detect_subsections: false,
            ..ScanOptions::default()
        };
        assert_eq!(
            BlockScanner::new("1.1. Intro\n1.2. Scope", options).scan(),
            vec![Block::OrderedList {
                items: strings(&["Intro", "Scope"])
            }]
        );
        assert_eq!(
            BlockScanner::new("1. Goals\n1.1. Detail", options).scan(),
            vec![Block::OrderedList {
                items: strings(&["Goals", "Detail"])
            }]
        );
        // no trailing dot: never an item, either way
        assert_eq!(
            BlockScanner::new("6.1 Macro", options).scan(),
            vec![para("6.1 Macro")]
        );
    }

    #[test]
    fn max_start_is_overridable() {
        let options = ScanOptions {
            ordered_list_max_start: 10,
            ..ScanOptions::default()
        };
        assert_eq!(
            BlockScanner::new("6. Deep dive", options).scan(),
            vec![Block::OrderedList {
                items: strings(&["Deep dive"])
            }]
        );
    }

    #[test]
    fn code_block_keeps_lines_verbatim() {
        assert_eq!(
            scan("```rust\nfn main() {\n    **not bold**\n}\n```"),
            vec![Block::CodeBlock {
                language: "rust".to_string(),
                code: "fn main() {\n    **not bold**\n}".to_string(),
            }]
        );
    }

    #[test]
    fn code_block_default_language() {
        assert_eq!(
            scan("```\nx\n```"),
            vec![Block::CodeBlock {
                language: "plaintext".to_string(),
                code: "x".to_string(),
            }]
        );
    }

    #[test]
    fn unterminated_fence_is_a_paragraph_line() {
        assert_eq!(
            scan("```python\nprint(1)"),
            vec![para("```python"), para("print(1)")]
        );
    }

    #[test]
    fn quote_lines_join_with_newlines() {
        assert_eq!(
            scan("> first\n> second\nafter"),
            vec![
                Block::Quote {
                    text: "first\nsecond".to_string()
                },
                para("after"),
            ]
        );
    }

    #[test]
    fn divider_does_not_come_from_blank_lines() {
        assert_eq!(
            scan("a\n\n---\n\nb"),
            vec![para("a"), Block::Divider, para("b")]
        );
    }

    #[test]
    fn table_with_rows() {
        assert_eq!(
            scan("| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |"),
            vec![Block::Table(Table {
                headers: strings(&["a", "b"]),
                rows: vec![strings(&["1", "2"]), strings(&["3", "4"])],
            })]
        );
    }

    #[test]
    fn table_without_separator_is_a_paragraph() {
        assert_eq!(
            scan("| a | b |\n| 1 | 2 |"),
            vec![para("| a | b | | 1 | 2 |")]
        );
    }

    #[test]
    fn header_and_separator_alone_are_a_paragraph() {
        assert_eq!(
            scan("| a | b |\n|---|---|"),
            vec![para("| a | b | |---|---|")]
        );
        assert_eq!(
            scan("| a | b |\n|---|---|\n| |"),
            vec![para("| a | b | |---|---| | |")]
        );
    }

    #[test]
    fn single_dash_cells_are_data() {
        assert_eq!(
            scan("| k | v |\n|---|---|\n| x | 1 |\n| - | - |\n| y | 2 |"),
            vec![Block::Table(Table {
                headers: strings(&["k", "v"]),
                rows: vec![
                    strings(&["x", "1"]),
                    strings(&["-", "-"]),
                    strings(&["y", "2"]),
                ],
            })]
        );
    }

    #[test]
    fn table_ends_at_non_pipe_line() {
        let blocks = scan("| a |\n|---|\n| 1 |\ntext after");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], para("text after"));
    }

    #[test]
    fn paragraph_joins_lines_until_block_opener() {
        assert_eq!(
            scan("first line\n  second line\n- item"),
            vec![
                para("first line second line"),
                Block::BulletList {
                    items: strings(&["item"])
                },
            ]
        );
    }

    #[test]
    fn paragraph_spans_are_parsed() {
        assert_eq!(
            scan("**bold** and `code`"),
            vec![Block::Paragraph {
                text: vec![
                    Span::new("bold", SpanStyle::Bold),
                    Span::plain(" and "),
                    Span::new("code", SpanStyle::Code),
                ]
                .into()
            }]
        );
    }

    #[test]
    fn order_follows_source() {
        let blocks = scan("# H\n- a\n1. b\n> c\n---\ntext");
        let kinds: Vec<&str> = blocks
            .iter()
            .map(|b| match b {
                Block::Heading { .. } => "heading",
                Block::BulletList { .. } => "bullet",
                Block::OrderedList { .. } => "ordered",
                Block::Quote { .. } => "quote",
                Block::Divider => "divider",
                Block::Paragraph { .. } => "paragraph",
                Block::CodeBlock { .. } => "code",
                Block::Table(_) => "table",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["heading", "bullet", "ordered", "quote", "divider", "paragraph"]
        );
    }
}
