use std::fmt::Write;
use std::sync::OnceLock;

use regex::Regex;

/// Characters left as-is when percent-encoding a destination.
const UNENCODED: &[u8] = b";/?:@&=+$,-_.!~*'()#";

/// Percent-encode characters that are not safe in a URL.
///
/// Existing `%XX` escapes are kept; any other `%` is encoded. Non-ASCII
/// characters are encoded byte by byte as UTF-8.
pub fn normalize_link(url: &str) -> String {
    let bytes = url.as_bytes();
    let mut out = String::with_capacity(url.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            out.push_str(&url[i..i + 3]);
            i += 3;
            continue;
        }

        if byte.is_ascii_alphanumeric() || UNENCODED.contains(&byte) {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
        i += 1;
    }
    out
}

fn bad_protocol_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(vbscript|javascript|file|data):").expect("Invalid protocol regex"))
}

fn good_data_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data:image/(gif|png|jpeg|webp);").expect("Invalid data URL regex")
    })
}

/// Whether a normalized link may be used as an `href` or `src`.
///
/// Script-capable protocols are rejected; `data:` is only allowed for a few
/// image types.
pub fn validate_link(url: &str) -> bool {
    let url = url.trim().to_lowercase();
    if bad_protocol_regex().is_match(&url) {
        good_data_regex().is_match(&url)
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.org/path", "https://example.org/path")]
    #[case("a b", "a%20b")]
    #[case("ä", "%C3%A4")]
    #[case("%41%zz", "%41%25zz")]
    #[case("a{b}", "a%7Bb%7D")]
    #[case("q?x=1&y=[2]", "q?x=1&y=%5B2%5D")]
    fn normalization(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_link(input), expected);
    }

    #[rstest]
    #[case("https://example.org", true)]
    #[case("/relative", true)]
    #[case("javascript:alert(1)", false)]
    #[case("JavaScript:alert(1)", false)]
    #[case("vbscript:x", false)]
    #[case("file:///etc/passwd", false)]
    #[case("data:text/html;base64,xx", false)]
    #[case("data:image/png;base64,xx", true)]
    fn validation(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(validate_link(url), expected);
    }
}
