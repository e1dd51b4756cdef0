/// Inline link `[text](url)`.
///
/// Both the text and the url must be non-empty. The text ends at the first
/// `]` and the url at the first `)`.
pub struct Link;

impl Link {
    pub const TEXT_OPEN: u8 = b'[';
    pub const TEXT_CLOSE: u8 = b']';
    pub const URL_OPEN: u8 = b'(';
    pub const URL_CLOSE: u8 = b')';
}
