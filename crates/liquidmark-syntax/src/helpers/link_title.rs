use super::unescape_all;

/// A parsed link title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTitle {
    pub text: String,
    /// Offset just past the closing quote or paren
    pub end: usize,
}

/// Parse a link title in `"..."`, `'...'` or `(...)` form starting at `start`.
pub fn parse_link_title(src: &str, start: usize, max: usize) -> Option<LinkTitle> {
    let bytes = src.as_bytes();
    let max = max.min(bytes.len());
    if start >= max {
        return None;
    }

    let marker = match bytes[start] {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };

    let mut pos = start + 1;
    while pos < max {
        let code = bytes[pos];
        if code == marker {
            return Some(LinkTitle {
                text: unescape_all(&src[start + 1..pos]).into_owned(),
                end: pos + 1,
            });
        } else if code == b'(' && marker == b')' {
            return None;
        } else if code == b'\\' && pos + 1 < max {
            pos += 1;
        }
        pos += 1;
    }
    None
}
