use crate::parsing::{Block, Table, parse_inline};

use super::{TextObject, WireBlock, WireKind};

/// Maps one scanned block to its wire blocks.
///
/// Lists expand to one wire block per item. Tables are not translated here:
/// they go through the two-phase table protocol and yield an empty result.
pub fn translate(block: &Block) -> Vec<WireBlock> {
    match block {
        Block::Heading { level, text } => vec![WireBlock::heading(*level, rich(text))],
        Block::Paragraph { text } => vec![WireBlock::text(TextObject::from(text))],
        Block::BulletList { items } => items_as(WireKind::Bullet, items),
        Block::OrderedList { items } => items_as(WireKind::Ordered, items),
        // code is written verbatim; the store has no language field we fill
        Block::CodeBlock { code, .. } => {
            vec![WireBlock::with_text(WireKind::Code, TextObject::plain(code))]
        }
        Block::Quote { text } => vec![WireBlock::with_text(WireKind::Quote, rich(text))],
        Block::Divider => vec![WireBlock::divider()],
        Block::Table(_) => vec![],
    }
}

/// Degraded rendering of a table: one text block per logical row.
pub fn flatten_table(table: &Table) -> Vec<WireBlock> {
    table
        .flattened_lines()
        .iter()
        .map(|line| WireBlock::text(rich(line)))
        .collect()
}

fn rich(text: &str) -> TextObject {
    TextObject::from(&parse_inline(text))
}

fn items_as(kind: WireKind, items: &[String]) -> Vec<WireBlock> {
    items
        .iter()
        .map(|item| WireBlock::with_text(kind, rich(item)))
        .collect()
}
