//! Link destination grammar, with template tags accepted as destinations.

use log::trace;

use super::unescape_all;
use crate::tag::TemplateTag;

/// Deepest unescaped `(` nesting a bare destination may contain.
pub const MAX_DESTINATION_DEPTH: usize = 32;

/// A recognized link destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDestination {
    /// Unescaped URL, or the verbatim tag text when `is_tag` is set
    pub text: String,
    /// Offset just past the destination
    pub end: usize,
    /// The destination is a template tag, not a URL
    pub is_tag: bool,
}

/// Parse a link destination at `start`, trying a template tag before the
/// conventional forms.
///
/// - `<...>`: angle form, delegated to the conventional grammar.
/// - `{{ ... }}` / `{% ... %}`: template tag, returned verbatim with
///   `is_tag` set. A `{` that does not open a complete tag fails.
/// - anything else: bare form with balanced parentheses.
pub fn parse_link_destination(src: &str, start: usize, max: usize) -> Option<LinkDestination> {
    let bytes = src.as_bytes();
    let max = max.min(bytes.len());
    if start >= max {
        return None;
    }

    match bytes[start] {
        b'<' => parse_angle(src, start, max),
        b'{' => {
            let tag = TemplateTag::scan(src, start, max);
            match &tag {
                Some(tag) => trace!("tag destination {:?} at {}", tag.raw, start),
                None => trace!("no complete tag destination at {start}"),
            }
            tag.map(|tag| LinkDestination {
                text: tag.raw.to_string(),
                end: tag.span.end,
                is_tag: true,
            })
        }
        _ => parse_bare(src, start, max),
    }
}

/// Parse a link destination with the plain CommonMark grammar only.
///
/// Used when template tags are disabled and for reference definitions.
pub fn parse_conventional_destination(
    src: &str,
    start: usize,
    max: usize,
) -> Option<LinkDestination> {
    let bytes = src.as_bytes();
    let max = max.min(bytes.len());
    if start >= max {
        return None;
    }

    if bytes[start] == b'<' {
        parse_angle(src, start, max)
    } else {
        parse_bare(src, start, max)
    }
}

fn parse_angle(src: &str, start: usize, max: usize) -> Option<LinkDestination> {
    let bytes = src.as_bytes();
    let mut pos = start + 1;
    while pos < max {
        match bytes[pos] {
            b'\n' | b'<' => return None,
            b'>' => {
                return Some(LinkDestination {
                    text: unescape_all(&src[start + 1..pos]).into_owned(),
                    end: pos + 1,
                    is_tag: false,
                });
            }
            b'\\' if pos + 1 < max => {
                pos += 2;
                continue;
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

fn parse_bare(src: &str, start: usize, max: usize) -> Option<LinkDestination> {
    let bytes = src.as_bytes();
    let mut level = 0usize;
    let mut pos = start;

    while pos < max {
        let code = bytes[pos];
        if code == b' ' || code < 0x20 || code == 0x7f {
            break;
        }
        if code == b'\\' && pos + 1 < max {
            if bytes[pos + 1] == b' ' {
                break;
            }
            pos += 2;
            continue;
        }
        if code == b'(' {
            level += 1;
            if level > MAX_DESTINATION_DEPTH {
                trace!("destination at {start} nests deeper than {MAX_DESTINATION_DEPTH}");
                return None;
            }
        }
        if code == b')' {
            if level == 0 {
                break;
            }
            level -= 1;
        }
        pos += 1;
    }

    if start == pos || level != 0 {
        return None;
    }

    Some(LinkDestination {
        text: unescape_all(&src[start..pos]).into_owned(),
        end: pos,
        is_tag: false,
    })
}
