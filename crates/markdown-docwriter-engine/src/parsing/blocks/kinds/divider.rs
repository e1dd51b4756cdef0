/// Thematic break: three or more of the same `-`, `*` or `_`.
pub struct Divider;

impl Divider {
    pub const MARKERS: [char; 3] = ['-', '*', '_'];
    pub const MIN_RUN: usize = 3;

    pub fn matches(line: &str) -> bool {
        let mut chars = line.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        Self::MARKERS.contains(&first)
            && chars.all(|c| c == first)
            && line.len() >= Self::MIN_RUN
    }
}
