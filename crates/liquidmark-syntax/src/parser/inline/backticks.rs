use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;
use crate::token::{Nesting, TokenKind};

/// Code spans delimited by backtick runs of equal length.
pub struct Backticks;

impl InlineRule for Backticks {
    fn name(&self) -> &'static str {
        "backticks"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        let src = state.src;
        let bytes = src.as_bytes();
        let start = state.pos;
        let max = state.pos_max;
        if bytes.get(start) != Some(&b'`') {
            return false;
        }

        let mut pos = start + 1;
        while pos < max && bytes[pos] == b'`' {
            pos += 1;
        }
        let opener_len = pos - start;

        // a scan from an earlier opener already passed every run after this one
        let scanned = state
            .backticks_scanned
            .is_some_and(|(scan_max, scan_from)| scan_max == max && scan_from <= start)
            && state
                .backticks
                .get(&opener_len)
                .is_none_or(|&last| last <= start);

        let mut match_end = pos;
        while !scanned && let Some(offset) = src[match_end..max].find('`') {
            let match_start = match_end + offset;
            match_end = match_start + 1;
            while match_end < max && bytes[match_end] == b'`' {
                match_end += 1;
            }
            let closer_len = match_end - match_start;

            if closer_len == opener_len {
                if !silent {
                    let content = code_content(&src[pos..match_start]);
                    let token = state.push(TokenKind::CodeInline, "code", Nesting::SelfClosing);
                    token.markup = "`".repeat(opener_len);
                    token.content = content;
                }
                state.pos = match_end;
                return true;
            }
            state
                .backticks
                .entry(closer_len)
                .and_modify(|last| *last = (*last).max(match_start))
                .or_insert(match_start);
        }
        if !scanned {
            state.backticks_scanned = Some((max, start));
        }

        // no closer of the same length: the run is literal
        if !silent {
            state.pending.push_str(&src[start..pos]);
        }
        state.pos = pos;
        true
    }
}

/// Newlines become spaces; one space is stripped from each end when both
/// ends have one.
fn code_content(raw: &str) -> String {
    let content = raw.replace('\n', " ");
    if content.len() > 2 && content.starts_with(' ') && content.ends_with(' ') {
        content[1..content.len() - 1].to_string()
    } else {
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Env;
    use crate::parser::inline::InlineParser;
    use crate::token::Token;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(src: &str) -> Vec<Token> {
        InlineParser::default().parse(src, &Env::default())
    }

    #[test]
    fn unmatched_runs_are_scanned_once() {
        // runs of distinct lengths never close each other
        let src: String = (1..=300).map(|n| "`".repeat(n) + " x ").collect();
        let parser = InlineParser::default();
        let env = Env::default();
        let mut state = InlineState::new(&src, &env, &parser);
        parser.tokenize(&mut state);
        assert!(state.backticks_scanned.is_some());

        // a later opener is literal without looking at the rest of the range
        state.backticks.clear();
        state.pos = 4;
        assert!(Backticks.parse(&mut state, true));
        assert_eq!(state.pos, 6);
        assert!(state.backticks.is_empty());
    }

    #[test]
    fn later_runs_still_match_after_a_failed_scan() {
        let tokens = parse("``` a `b` ``c``");
        let code: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::CodeInline)
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(code, vec!["b", "c"]);
    }

    #[rstest]
    #[case(" a ", "a")]
    #[case("  a  ", " a ")]
    #[case("a\nb", "a b")]
    #[case(" a", " a")]
    #[case("  ", "  ")]
    fn content_normalization(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(code_content(raw), expected);
    }
}
