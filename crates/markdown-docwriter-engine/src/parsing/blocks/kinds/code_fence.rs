/// Backtick code fence.
pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: &'static str = "```";
    pub const DEFAULT_LANGUAGE: &'static str = "plaintext";

    /// Returns the language tag when the line opens a fence.
    pub fn open(line: &str) -> Option<&str> {
        let tag = line.strip_prefix(Self::BACKTICKS)?.trim();
        Some(if tag.is_empty() {
            Self::DEFAULT_LANGUAGE
        } else {
            tag
        })
    }

    /// A closing fence is exactly three backticks.
    pub fn closes(line: &str) -> bool {
        line == Self::BACKTICKS
    }
}
