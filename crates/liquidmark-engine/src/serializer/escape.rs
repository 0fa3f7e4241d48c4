use std::sync::OnceLock;

use regex::Regex;

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)(#{1,6})(\s|$)").expect("Invalid heading regex"))
}

fn ordered_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*[0-9]+)\.\s").expect("Invalid ordered list regex"))
}

fn is_word(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Escape Markdown syntax characters in plain text.
///
/// `_` between two word characters is left alone. `{` is escaped when it
/// would open a template tag (`{{`, `{%`). With `start_of_line`,
/// text that would start a list item, block quote or heading is escaped
/// as well.
pub fn escape(text: &str, start_of_line: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &ch) in chars.iter().enumerate() {
        if matches!(ch, '`' | '*' | '\\' | '~' | '[' | ']' | '_') {
            let word_internal = ch == '_'
                && i > 0
                && i + 1 < chars.len()
                && is_word(chars[i - 1])
                && is_word(chars[i + 1]);
            if !word_internal {
                out.push('\\');
            }
        }
        if ch == '{' && matches!(chars.get(i + 1), Some('{' | '%')) {
            out.push('\\');
        }
        out.push(ch);
    }

    if start_of_line {
        out = escape_line_start(out);
    }
    out
}

fn escape_line_start(mut text: String) -> String {
    if text.starts_with("+ ") || text.starts_with(['-', '*', '>']) {
        text.insert(0, '\\');
    }
    let text = heading_regex().replace(&text, "$1\\$2$3");
    ordered_regex().replace(&text, "$1\\. ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("a*b", "a\\*b")]
    #[case("snake_case", "snake_case")]
    #[case("_lead", "\\_lead")]
    #[case("[x] `y` ~z~", "\\[x\\] \\`y\\` \\~z\\~")]
    #[case("back\\slash", "back\\\\slash")]
    #[case("{{ not a tag here }}", "\\{{ not a tag here }}")]
    #[case("{% raw %} and { x }", "\\{% raw %} and { x }")]
    #[case("{{{", "\\{\\{{")]
    fn inline_escapes(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(escape(text, false), expected);
    }

    #[rstest]
    #[case("- item", "\\- item")]
    #[case("+ item", "\\+ item")]
    #[case("+1", "+1")]
    #[case("> quote", "\\> quote")]
    #[case("## title", "\\## title")]
    #[case("#hashtag", "#hashtag")]
    #[case("1. first", "1\\. first")]
    #[case("2024 was", "2024 was")]
    fn line_start_escapes(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(escape(text, true), expected);
    }

    #[test]
    fn line_start_only_when_asked() {
        assert_eq!(escape("- item", false), "- item");
    }
}
