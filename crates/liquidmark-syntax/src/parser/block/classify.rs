//! Line classification for the block pass.
//!
//! Every function here looks at a single line in isolation. Context
//! (what block is open, whether a paragraph can be interrupted) is the
//! driver's concern.

/// An opening code fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceOpen {
    /// `` ` `` or `~`
    pub marker: u8,
    /// Length of the marker run
    pub len: usize,
    /// Indentation of the opener, removed from content lines
    pub indent: usize,
    /// Raw info string, trimmed
    pub info: String,
}

/// A list item marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub ordered: bool,
    /// Bullet character, or `.`/`)` after an ordered number
    pub marker: u8,
    /// Number of an ordered item
    pub start: u32,
    /// Column where item content starts
    pub content_offset: usize,
    /// Nothing follows the marker on this line
    pub empty: bool,
}

impl ListMarker {
    /// Whether an item with `other` continues the list this one started.
    pub fn same_list(&self, other: &ListMarker) -> bool {
        self.ordered == other.ordered && self.marker == other.marker
    }

    /// Whether this item may interrupt a paragraph.
    pub fn can_interrupt(&self) -> bool {
        !self.empty && (!self.ordered || self.start == 1)
    }
}

const TAB_STOP: usize = 4;

/// Only spaces and tabs.
pub fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

/// Leading indentation as (columns, bytes).
pub fn leading_indent(line: &str) -> (usize, usize) {
    indent_from(line, 0)
}

/// Leading indentation of `text` when it starts at column `start_col`.
fn indent_from(text: &str, start_col: usize) -> (usize, usize) {
    let mut cols = 0;
    let mut bytes = 0;
    for byte in text.bytes() {
        match byte {
            b' ' => cols += 1,
            b'\t' => cols += TAB_STOP - (start_col + cols) % TAB_STOP,
            _ => break,
        }
        bytes += 1;
    }
    (cols, bytes)
}

/// Remove `cols` columns from the start of `line`.
///
/// Tabs expand to the next tab stop; a tab only partly removed leaves its
/// remaining columns as spaces. Other characters count one column.
pub fn remove_columns(line: &str, cols: usize) -> String {
    let mut col = 0;
    for (i, ch) in line.char_indices() {
        if col >= cols {
            return line[i..].to_string();
        }
        if ch == '\t' {
            let width = TAB_STOP - col % TAB_STOP;
            if col + width > cols {
                return " ".repeat(col + width - cols) + &line[i + 1..];
            }
            col += width;
        } else {
            col += 1;
        }
    }
    String::new()
}

/// Remove up to `cols` columns of leading whitespace.
pub fn strip_indent(line: &str, cols: usize) -> String {
    remove_columns(line, cols.min(leading_indent(line).0))
}

/// ```` ``` ```` or `~~~` opener with optional info string.
pub fn fence_open(line: &str) -> Option<FenceOpen> {
    let (indent, offset) = leading_indent(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[offset..];
    let marker = *rest.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }

    let len = rest.bytes().take_while(|&b| b == marker).count();
    if len < 3 {
        return None;
    }

    let info = rest[len..].trim_matches([' ', '\t']);
    if marker == b'`' && info.contains('`') {
        return None;
    }

    Some(FenceOpen {
        marker,
        len,
        indent,
        info: info.to_string(),
    })
}

/// Whether `line` closes the fence `open`.
pub fn closes_fence(line: &str, open: &FenceOpen) -> bool {
    let (indent, offset) = leading_indent(line);
    if indent > 3 {
        return false;
    }
    let rest = &line[offset..];
    let len = rest.bytes().take_while(|&b| b == open.marker).count();
    len >= open.len && is_blank(&rest[len..])
}

/// `#` to `######` heading: (level, content).
pub fn atx_heading(line: &str) -> Option<(u8, &str)> {
    let (indent, offset) = leading_indent(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[offset..];
    let level = rest.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }

    let body = &rest[level..];
    if !body.is_empty() && !body.starts_with([' ', '\t']) {
        return None;
    }

    // drop a closing `#` sequence preceded by whitespace
    let trimmed = body.trim_end_matches([' ', '\t']);
    let without_hashes = trimmed.trim_end_matches('#');
    let end = if without_hashes.len() < trimmed.len()
        && (without_hashes.is_empty() || without_hashes.ends_with([' ', '\t']))
    {
        without_hashes.len()
    } else {
        trimmed.len()
    };

    Some((level as u8, body[..end].trim_matches([' ', '\t'])))
}

/// Three or more `-`, `*` or `_`, optionally separated by spaces.
pub fn is_thematic_break(line: &str) -> bool {
    let (indent, offset) = leading_indent(line);
    if indent > 3 {
        return false;
    }
    let rest = &line[offset..];
    let Some(&marker) = rest.as_bytes().first() else {
        return false;
    };
    if !matches!(marker, b'-' | b'*' | b'_') {
        return false;
    }

    let mut count = 0;
    for byte in rest.bytes() {
        if byte == marker {
            count += 1;
        } else if byte != b' ' && byte != b'\t' {
            return false;
        }
    }
    count >= 3
}

/// `===` (level 1) or `---` (level 2) under a paragraph.
pub fn setext_underline(line: &str) -> Option<u8> {
    let (indent, offset) = leading_indent(line);
    if indent > 3 {
        return None;
    }
    let rest = line[offset..].trim_end_matches([' ', '\t']);
    let level = match rest.as_bytes().first()? {
        b'=' => 1,
        b'-' => 2,
        _ => return None,
    };
    let marker = rest.as_bytes()[0];
    rest.bytes().all(|b| b == marker).then_some(level)
}

/// Strip one `>` marker and the optional following space.
pub fn strip_blockquote(line: &str) -> Option<String> {
    let (indent, offset) = leading_indent(line);
    if indent > 3 {
        return None;
    }
    let after = line[offset..].strip_prefix('>')?;

    match after.as_bytes().first() {
        Some(b' ') => Some(after[1..].to_string()),
        Some(b'\t') => {
            // the tab counts one column as the optional space
            let col = indent + 1;
            let width = TAB_STOP - col % TAB_STOP;
            Some(" ".repeat(width - 1) + &after[1..])
        }
        _ => Some(after.to_string()),
    }
}

/// Bullet (`-`, `+`, `*`) or ordered (`1.`, `1)`) list marker.
pub fn list_marker(line: &str) -> Option<ListMarker> {
    let (indent, offset) = leading_indent(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[offset..];
    let bytes = rest.as_bytes();

    let (ordered, marker, start, marker_len) = match *bytes.first()? {
        bullet @ (b'-' | b'+' | b'*') => (false, bullet, 1, 1),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 {
                return None;
            }
            let delimiter = *bytes.get(digits)?;
            if delimiter != b'.' && delimiter != b')' {
                return None;
            }
            (true, delimiter, rest[..digits].parse().ok()?, digits + 1)
        }
        _ => return None,
    };

    let after = &rest[marker_len..];
    if !after.is_empty() && !after.starts_with([' ', '\t']) {
        return None;
    }

    let empty = is_blank(after);
    let marker_end = indent + marker_len;
    let (spaces, _) = indent_from(after, marker_end);
    // five or more spaces start indented code: content begins after one
    let padding = if empty || spaces > 4 { 1 } else { spaces };

    Some(ListMarker {
        ordered,
        marker,
        start,
        content_offset: marker_end + padding,
        empty,
    })
}

/// Whether `line` starts a block that ends a paragraph.
pub fn interrupts_paragraph(line: &str) -> bool {
    if leading_indent(line).0 > 3 {
        return false;
    }
    fence_open(line).is_some()
        || atx_heading(line).is_some()
        || is_thematic_break(line)
        || strip_blockquote(line).is_some()
        || list_marker(line).is_some_and(|marker| marker.can_interrupt())
}

/// Whether `line` reads as paragraph text that a lazy line may continue.
pub fn continues_paragraph(line: &str) -> bool {
    let mut inner = line.to_string();
    while let Some(stripped) = strip_blockquote(&inner) {
        inner = stripped;
    }
    !is_blank(&inner)
        && leading_indent(&inner).0 < 4
        && fence_open(&inner).is_none()
        && atx_heading(&inner).is_none()
        && !is_thematic_break(&inner)
}
