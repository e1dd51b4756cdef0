use std::sync::OnceLock;

use regex::Regex;

/// Bullet list item: `-`, `*` or `+`, whitespace, then text.
pub struct BulletList;

impl BulletList {
    pub const MARKERS: [char; 3] = ['-', '*', '+'];

    /// Returns the item text when the line is a bullet item.
    pub fn item(line: &str) -> Option<&str> {
        let mut chars = line.chars();
        let marker = chars.next()?;
        if !Self::MARKERS.contains(&marker) {
            return None;
        }
        item_text(chars.as_str())
    }
}

/// A `<digits>. <text>` line, or a multi-level `<digits>.<digits>. <text>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedItem<'a> {
    /// Leading number; `None` when it does not fit in a `u64`.
    pub number: Option<u64>,
    pub text: &'a str,
}

/// Ordered list item syntax and the numbered-section heuristics.
pub struct OrderedList;

impl OrderedList {
    pub const DELIMITER: char = '.';

    /// Matches the number and text of an item. Multi-level numbers
    /// (`1.2. Scope`) are accepted; the number is the first level.
    pub fn item(line: &str) -> Option<OrderedItem<'_>> {
        let digits = leading_digits(line);
        if digits == 0 {
            return None;
        }
        let mut rest = &line[digits..];
        loop {
            rest = rest.strip_prefix(Self::DELIMITER)?;
            match leading_digits(rest) {
                0 => break,
                n => rest = &rest[n..],
            }
        }
        let text = item_text(rest)?;
        Some(OrderedItem {
            number: line[..digits].parse().ok(),
            text,
        })
    }

    /// Multi-level section numbers such as `6.1 Macro risk` or `1.2. Scope`.
    ///
    /// These are headings in disguise and never start a list while
    /// subsection detection is on.
    pub fn is_subsection(line: &str) -> bool {
        static SUBSECTION: OnceLock<Regex> = OnceLock::new();
        SUBSECTION
            .get_or_init(|| Regex::new(r"^\d+(\.\d+)+\.?\s+").expect("valid subsection regex"))
            .is_match(line.trim())
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Text after a list marker: at least one whitespace, then non-empty text.
fn item_text(rest: &str) -> Option<&str> {
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim_start();
    (!text.is_empty()).then_some(text)
}
