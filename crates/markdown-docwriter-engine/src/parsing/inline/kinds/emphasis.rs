/// Asterisk emphasis delimiters, longest first.
///
/// The same character opens all three styles, so the parser must try
/// `BOLD_ITALIC` before `BOLD` before `ITALIC`.
pub struct Emphasis;

impl Emphasis {
    pub const BOLD_ITALIC: &'static [u8] = b"***";
    pub const BOLD: &'static [u8] = b"**";
    pub const ITALIC: &'static [u8] = b"*";
}
