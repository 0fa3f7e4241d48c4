//! Shared scanning helpers for the block and inline passes.

mod link_destination;
mod link_label;
mod link_title;
mod url;

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

pub use link_destination::{
    LinkDestination, MAX_DESTINATION_DEPTH, parse_conventional_destination, parse_link_destination,
};
pub use link_label::parse_link_label;
pub use link_title::{LinkTitle, parse_link_title};
pub use url::{normalize_link, validate_link};

/// Space or tab.
pub fn is_space(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Unicode whitespace as CommonMark's flanking rules see it.
pub fn is_white_space(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\u{0b}'
            | '\u{0c}'
            | '\r'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
    )
}

/// ASCII or Unicode punctuation (approximated for non-ASCII as "not
/// alphanumeric and not whitespace").
pub fn is_punct_char(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_punctuation();
    }
    !ch.is_alphanumeric() && !ch.is_whitespace()
}

/// Characters that a backslash may escape.
pub fn is_escapable(byte: u8) -> bool {
    byte.is_ascii_punctuation()
}

fn unescape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r##"\\([!"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~])|&([A-Za-z#][A-Za-z0-9]{1,31});"##)
            .expect("Invalid unescape regex")
    })
}

/// Resolve backslash escapes and HTML entities in `src`.
pub fn unescape_all(src: &str) -> Cow<'_, str> {
    if !src.contains('\\') && !src.contains('&') {
        return Cow::Borrowed(src);
    }
    unescape_regex().replace_all(src, |caps: &Captures<'_>| {
        if let Some(escaped) = caps.get(1) {
            return escaped.as_str().to_string();
        }
        let whole = &caps[0];
        decode_entity(whole).unwrap_or_else(|| whole.to_string())
    })
}

/// Decode one `&...;` entity, numeric or named.
///
/// Returns `None` for unknown names and for code points HTML forbids.
pub fn decode_entity(entity: &str) -> Option<String> {
    let name = entity.strip_prefix('&')?.strip_suffix(';')?;
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) if (1..=8).contains(&hex.len()) => u32::from_str_radix(hex, 16).ok()?,
            None if (1..=8).contains(&number.len()) => number.parse::<u32>().ok()?,
            _ => return None,
        };
        return valid_entity_code(code)
            .then(|| char::from_u32(code))
            .flatten()
            .map(String::from);
    }
    match html_escape::decode_html_entities(entity) {
        Cow::Owned(decoded) if decoded != entity => Some(decoded),
        _ => None,
    }
}

fn valid_entity_code(code: u32) -> bool {
    !((0xd800..=0xdfff).contains(&code)
        || (0xfdd0..=0xfdef).contains(&code)
        || (code & 0xffff) == 0xffff
        || (code & 0xffff) == 0xfffe
        || code <= 0x08
        || code == 0x0b
        || (0x0e..=0x1f).contains(&code)
        || (0x7f..=0x9f).contains(&code)
        || code > 0x10ffff)
}

/// Normalize a reference label for lookup: trim, collapse internal
/// whitespace, case-fold.
pub fn normalize_reference(label: &str) -> String {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase().to_uppercase()
}

/// Length in bytes of the character starting at `pos`, or 1 if `pos` is
/// not on a character boundary.
pub(crate) fn char_len_at(src: &str, pos: usize) -> usize {
    src.get(pos..)
        .and_then(|rest| rest.chars().next())
        .map_or(1, char::len_utf8)
}

/// Skip spaces, tabs and newlines starting at `pos`.
pub(crate) fn skip_whitespace(src: &[u8], mut pos: usize, max: usize) -> usize {
    while pos < max && (is_space(src[pos]) || src[pos] == b'\n') {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(r"\*not emphasis\*", "*not emphasis*")]
    #[case(r"a\b", r"a\b")]
    #[case("&amp; &copy;", "& ©")]
    #[case("&#35; &#x41;", "# A")]
    #[case("&#0;", "&#0;")]
    #[case("&bogus;", "&bogus;")]
    #[case(r"\{\{ x \}\}", "{{ x }}")]
    fn unescape_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unescape_all(input), expected);
    }

    #[test]
    fn unescape_borrows_when_nothing_to_do() {
        assert!(matches!(unescape_all("plain"), Cow::Borrowed("plain")));
    }

    #[rstest]
    #[case("  Foo   Bar ", "FOO BAR")]
    #[case("foo\nbar", "FOO BAR")]
    #[case("ẞ", "SS")]
    fn reference_normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_reference(input), expected);
    }

    #[test]
    fn punctuation_classification() {
        assert!(is_punct_char('*'));
        assert!(is_punct_char('{'));
        assert!(is_punct_char('。'));
        assert!(!is_punct_char('a'));
        assert!(!is_punct_char('é'));
        assert!(is_white_space('\u{a0}'));
        assert!(!is_white_space('x'));
    }
}
