//! # Lexer - Plain Text Runs
//!
//! Inline parsing is driven by a small set of **terminator characters**:
//! characters on which some inline rule may start (`*`, `[`, `{`, `` ` ``,
//! `\`, newline, ...). Everything between terminators is plain text that no
//! rule can claim, so the `text` rule swallows it in one step.
//!
//! The classification is done by a [Logos] lexer. Only the first token of
//! the remaining input matters to the caller, so lexing is lazy and stops
//! there.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ```
//! use liquidmark_syntax::lexer::text_run_len;
//!
//! assert_eq!(text_run_len("Hello {{ name }}"), 6);
//! assert_eq!(text_run_len("{{ name }}"), 0);
//! ```

use logos::Logos;

/// Character classes seen by the inline tokenizer.
///
/// The terminator set matches the CommonMark reference tokenizer's, which
/// already includes `{`, `}` and `%` so template tag delimiters always stop
/// a text run.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineChar {
    /// A run of characters no inline rule can start on
    #[regex(r"[^\n!#$%&*+\-:<=>@\[\\\]^_`{}~]+")]
    Text,

    /// A single character that may start an inline construct
    #[regex(r"[\n!#$%&*+\-:<=>@\[\\\]^_`{}~]")]
    Terminator,
}

/// Byte length of the plain text run at the start of `input`.
///
/// Returns 0 when `input` is empty or starts with a terminator.
pub fn text_run_len(input: &str) -> usize {
    let mut lexer = InlineChar::lexer(input);
    match lexer.next() {
        Some(Ok(InlineChar::Text)) => lexer.span().end,
        _ => 0,
    }
}

/// Whether `byte` is a terminator character.
pub fn is_terminator(byte: u8) -> bool {
    matches!(
        byte,
        b'\n'
            | b'!'
            | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'*'
            | b'+'
            | b'-'
            | b':'
            | b'<'
            | b'='
            | b'>'
            | b'@'
            | b'['
            | b'\\'
            | b']'
            | b'^'
            | b'_'
            | b'`'
            | b'{'
            | b'}'
            | b'~'
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("hello", 5)]
    #[case("hello world*", 11)]
    #[case("*emphasis", 0)]
    #[case("name }}", 5)]
    #[case("if x %}", 5)]
    #[case("héllo{", 6)]
    #[case("line\nnext", 4)]
    fn text_run_lengths(#[case] input: &str, #[case] expected: usize) {
        assert_eq!(text_run_len(input), expected);
    }

    #[test]
    fn tag_delimiters_are_terminators() {
        for byte in [b'{', b'}', b'%'] {
            assert!(is_terminator(byte));
        }
        assert!(!is_terminator(b'a'));
        assert!(!is_terminator(b' '));
    }

    #[test]
    fn lexer_and_byte_table_agree() {
        for byte in 0x20u8..0x7f {
            let s = (byte as char).to_string();
            assert_eq!(
                text_run_len(&s) == 0,
                is_terminator(byte),
                "disagreement on {:?}",
                byte as char
            );
        }
    }
}
