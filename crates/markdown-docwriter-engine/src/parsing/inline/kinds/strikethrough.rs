pub struct Strikethrough;

impl Strikethrough {
    pub const TILDES: &'static [u8] = b"~~";
}
