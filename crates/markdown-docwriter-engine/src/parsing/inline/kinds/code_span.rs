/// Inline code span delimiter.
pub struct CodeSpan;

impl CodeSpan {
    /// The backtick that opens and closes a code span.
    pub const TICK: &'static [u8] = b"`";
}
