/// Pipe table row syntax.
pub struct TableRow;

impl TableRow {
    pub const PIPE: char = '|';
    /// A separator needs at least one run of two dashes; `| - |` is data.
    pub const RULE: &str = "--";
    const SEPARATOR_CHARS: [char; 4] = ['|', '-', ':', ' '];

    pub fn has_pipe(line: &str) -> bool {
        line.contains(Self::PIPE)
    }

    /// A header separator such as `|---|:---:|`.
    pub fn is_separator(line: &str) -> bool {
        Self::has_pipe(line)
            && line.contains(Self::RULE)
            && line.chars().all(|c| Self::SEPARATOR_CHARS.contains(&c))
    }

    /// Trimmed, non-empty cells between pipes.
    pub fn cells(line: &str) -> Vec<String> {
        line.split(Self::PIPE)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}
