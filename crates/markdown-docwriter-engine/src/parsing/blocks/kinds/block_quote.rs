/// Block quote prefix. Only `> ` with a following space opens or continues
/// a quote.
pub struct BlockQuote;

impl BlockQuote {
    pub const PREFIX: &'static str = "> ";

    /// Returns the quoted text with the prefix removed.
    pub fn strip(line: &str) -> Option<&str> {
        line.strip_prefix(Self::PREFIX)
    }
}
