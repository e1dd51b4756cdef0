/// ATX heading syntax: 1–6 `#`, whitespace, then text.
pub struct Heading;

impl Heading {
    pub const MARKER: char = '#';
    pub const MAX_LEVEL: usize = 6;

    /// Returns `(level, text)` when the line is a heading.
    pub fn parse(line: &str) -> Option<(u8, &str)> {
        let level = line.chars().take_while(|&c| c == Self::MARKER).count();
        if level == 0 || level > Self::MAX_LEVEL {
            return None;
        }
        let rest = &line[level..];
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let text = rest.trim_start();
        if text.is_empty() {
            return None;
        }
        u8::try_from(level).ok().map(|level| (level, text))
    }
}
