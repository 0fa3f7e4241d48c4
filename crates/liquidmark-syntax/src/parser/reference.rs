//! Link reference definitions: `[label]: destination "title"`.

use log::debug;

use super::Reference;
use crate::helpers::{
    is_space, normalize_link, normalize_reference, parse_conventional_destination,
    parse_link_title, validate_link,
};

/// Longest label a definition may have.
const MAX_LABEL_LEN: usize = 999;

/// A definition read from the start of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Definition {
    /// Normalized label
    pub label: String,
    pub reference: Reference,
    /// Bytes consumed, including the trailing newline
    pub consumed: usize,
}

/// Parse one definition at the very start of `src`.
pub(super) fn parse_definition(src: &str) -> Option<Definition> {
    let bytes = src.as_bytes();
    let max = bytes.len();

    let mut pos = 0;
    while pos < 3 && pos < max && bytes[pos] == b' ' {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'[') {
        return None;
    }

    let label_start = pos + 1;
    let label_end = find_label_end(bytes, label_start)?;
    if bytes.get(label_end + 1) != Some(&b':') {
        return None;
    }

    pos = skip_space_and_newlines(bytes, label_end + 2);

    let destination = parse_conventional_destination(src, pos, max)?;
    let href = normalize_link(&destination.text);
    if !validate_link(&href) {
        return None;
    }
    pos = destination.end;
    let dest_end = pos;

    let title_start = pos;
    pos = skip_space_and_newlines(bytes, pos);
    let mut title = String::new();
    if pos < max
        && title_start != pos
        && let Some(parsed) = parse_link_title(src, pos, max)
    {
        title = parsed.text;
        pos = parsed.end;
    } else {
        pos = dest_end;
    }

    pos = skip_spaces(bytes, pos);
    if pos < max && bytes[pos] != b'\n' {
        if title.is_empty() {
            return None;
        }
        // garbage after the title: retry without it
        title.clear();
        pos = skip_spaces(bytes, dest_end);
        if pos < max && bytes[pos] != b'\n' {
            return None;
        }
    }

    let label = normalize_reference(&src[label_start..label_end]);
    if label.is_empty() {
        return None;
    }

    let consumed = if pos < max { pos + 1 } else { pos };
    debug!("reference definition {label:?} -> {href:?}");
    Some(Definition {
        label,
        reference: Reference { href, title },
        consumed,
    })
}

fn find_label_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    while pos < bytes.len() {
        match bytes[pos] {
            b'[' => return None,
            b']' => {
                return (pos - start <= MAX_LABEL_LEN).then_some(pos);
            }
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }
    None
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_space(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn skip_space_and_newlines(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (is_space(bytes[pos]) || bytes[pos] == b'\n') {
        pos += 1;
    }
    pos
}
