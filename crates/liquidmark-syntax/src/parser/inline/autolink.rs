use std::sync::OnceLock;

use regex::Regex;

use crate::helpers::{normalize_link, validate_link};
use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;
use crate::token::{Nesting, TokenKind};

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]{1,31}:[^<>\x00-\x20]*$").expect("Invalid autolink regex")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~\-]+@[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("Invalid email regex")
    })
}

/// `<scheme:...>` and `<user@host>` autolinks.
pub struct Autolink;

impl InlineRule for Autolink {
    fn name(&self) -> &'static str {
        "autolink"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        let src = state.src;
        let start = state.pos;
        if src.as_bytes().get(start) != Some(&b'<') {
            return false;
        }

        let max = state.pos_max;
        let Some(close) = src[start + 1..max].find(['<', '>']).map(|i| start + 1 + i) else {
            return false;
        };
        if src.as_bytes()[close] != b'>' {
            return false;
        }

        let url = &src[start + 1..close];
        let href = if url_regex().is_match(url) {
            normalize_link(url)
        } else if email_regex().is_match(url) {
            normalize_link(&format!("mailto:{url}"))
        } else {
            return false;
        };

        if !validate_link(&href) {
            return false;
        }

        if !silent {
            let open = state.push(TokenKind::LinkOpen, "a", Nesting::Open);
            open.attrs.push(("href".to_string(), href));
            open.markup = "autolink".to_string();
            open.info = "auto".to_string();

            let text = state.push(TokenKind::Text, "", Nesting::SelfClosing);
            text.content = url.to_string();

            let close_token = state.push(TokenKind::LinkClose, "a", Nesting::Close);
            close_token.markup = "autolink".to_string();
            close_token.info = "auto".to_string();
        }

        state.pos = close + 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Env;
    use crate::parser::inline::InlineParser;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<https://example.org>", Some("https://example.org"))]
    #[case("<foo@example.org>", Some("mailto:foo@example.org"))]
    #[case("<not a link>", None)]
    #[case("<javascript:alert(1)>", None)]
    fn autolinks(#[case] src: &str, #[case] href: Option<&str>) {
        let tokens = InlineParser::default().parse(src, &Env::default());
        assert_eq!(tokens[0].attr("href"), href);
    }
}
