use super::{
    cursor::Cursor,
    kinds::{CodeSpan, Emphasis, Link, Strikethrough},
    types::{RichText, Span, SpanStyle},
};

/// Parses one line of text into a [`RichText`] of styled spans.
///
/// Text between constructs is emitted as `Plain` spans. Unclosed delimiters
/// stay in the plain text verbatim. A line with no constructs at all comes
/// back as a single plain span holding the whole line, including the empty
/// line.
pub fn parse_inline(s: &str) -> RichText {
    let mut cur = Cursor::new(s);
    let mut out = vec![];
    let mut text_start = cur.pos();

    fn flush_text(out: &mut Vec<Span>, cur: &Cursor<'_>, start: usize, end: usize) {
        if end > start {
            out.push(Span::plain(cur.slice(start, end)));
        }
    }

    while !cur.eof() {
        let start = cur.pos();
        if let Some(span) = try_parse_span(&mut cur) {
            flush_text(&mut out, &cur, text_start, start);
            out.push(span);
            text_start = cur.pos();
            continue;
        }
        cur.bump();
    }

    flush_text(&mut out, &cur, text_start, cur.pos());
    if out.is_empty() {
        out.push(Span::plain(s));
    }
    RichText(out)
}

/// Tries every construct at the current position in precedence order.
fn try_parse_span(cur: &mut Cursor<'_>) -> Option<Span> {
    let delimited = [
        (Emphasis::BOLD_ITALIC, SpanStyle::BoldItalic),
        (Emphasis::BOLD, SpanStyle::Bold),
        (Emphasis::ITALIC, SpanStyle::Italic),
        (CodeSpan::TICK, SpanStyle::Code),
        (Strikethrough::TILDES, SpanStyle::Strikethrough),
    ];
    for (delim, style) in delimited {
        if let Some(inner) = try_parse_delimited(cur, delim) {
            return Some(Span::new(inner, style));
        }
    }
    try_parse_link(cur).map(|(text, url)| {
        Span::new(
            text,
            SpanStyle::Link {
                url: url.to_string(),
            },
        )
    })
}

/// Parses `<delim>inner<delim>` where `inner` is non-empty and stays on one
/// line. The inner text ends at the first closing delimiter.
///
/// On failure, cursor position is restored.
fn try_parse_delimited<'a>(cur: &mut Cursor<'a>, delim: &[u8]) -> Option<&'a str> {
    if !cur.starts_with(delim) {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(delim.len());
    let inner_start = cur.pos();

    // at least one byte of content before a closer is accepted
    match cur.bump() {
        None | Some(b'\n') => {
            *cur = saved;
            return None;
        }
        Some(_) => {}
    }

    while !cur.eof() {
        if cur.starts_with(delim) {
            let inner = cur.slice(inner_start, cur.pos());
            cur.bump_n(delim.len());
            return Some(inner);
        }
        if cur.peek() == Some(b'\n') {
            break;
        }
        cur.bump();
    }

    *cur = saved;
    None
}

/// Parses `[text](url)`, returning `(text, url)`.
///
/// On failure, cursor position is restored.
fn try_parse_link<'a>(cur: &mut Cursor<'a>) -> Option<(&'a str, &'a str)> {
    if cur.peek() != Some(Link::TEXT_OPEN) {
        return None;
    }

    let saved = cur.clone();
    cur.bump(); // [
    let text = take_until(cur, Link::TEXT_CLOSE);
    let url = text.and_then(|text| {
        cur.bump(); // ]
        if cur.peek() != Some(Link::URL_OPEN) {
            return None;
        }
        cur.bump(); // (
        let url = take_until(cur, Link::URL_CLOSE)?;
        cur.bump(); // )
        Some((text, url))
    });

    if url.is_none() {
        *cur = saved;
    }
    url
}

/// Consumes a non-empty run of bytes up to (not including) `close`.
fn take_until<'a>(cur: &mut Cursor<'a>, close: u8) -> Option<&'a str> {
    let start = cur.pos();
    while !cur.eof() && cur.peek() != Some(close) {
        cur.bump();
    }
    if cur.eof() || cur.pos() == start {
        return None;
    }
    Some(cur.slice(start, cur.pos()))
}
