//! Markdown parser: block pass, then the inline pass over every inline
//! token.

mod block;
pub mod inline;
mod reference;
pub mod ruler;
pub mod state;

use std::collections::HashMap;

use log::debug;

use crate::token::{Token, TokenKind};
use inline::InlineParser;

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Inline nesting depth past which rules stop matching
    pub max_nesting: usize,
    /// Recognize template tags inline and as link destinations
    pub liquid_tags: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_nesting: 20,
            liquid_tags: true,
        }
    }
}

/// A link reference definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub href: String,
    pub title: String,
}

/// Document-level data shared between the block and inline passes.
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// Reference definitions keyed by normalized label
    pub references: HashMap<String, Reference>,
}

/// Markdown to token stream.
pub struct MarkdownParser {
    options: ParserOptions,
    inline: InlineParser,
}

impl MarkdownParser {
    pub fn new(options: ParserOptions) -> Self {
        let inline = InlineParser::new(&options);
        Self { options, inline }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn inline(&self) -> &InlineParser {
        &self.inline
    }

    pub fn inline_mut(&mut self) -> &mut InlineParser {
        &mut self.inline
    }

    /// Parse a whole document.
    pub fn parse(&self, src: &str) -> Vec<Token> {
        let mut env = Env::default();
        self.parse_with_env(src, &mut env)
    }

    /// Parse a whole document, collecting reference definitions into `env`.
    pub fn parse_with_env(&self, src: &str, env: &mut Env) -> Vec<Token> {
        let src = normalize(src);
        let mut tokens = block::parse(&src, env);
        debug!(
            "block pass: {} tokens, {} references",
            tokens.len(),
            env.references.len()
        );

        let mut inline_count = 0;
        for token in tokens.iter_mut().filter(|t| t.kind == TokenKind::Inline) {
            token.children = self.inline.parse(&token.content, env);
            inline_count += token.children.len();
        }
        debug!("inline pass: {inline_count} tokens");

        tokens
    }

    /// Parse a single inline buffer with no block structure.
    pub fn parse_inline(&self, src: &str, env: &Env) -> Vec<Token> {
        self.inline.parse(&normalize(src), env)
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

/// Normalize line endings to `\n` and replace NUL with U+FFFD.
pub fn normalize(src: &str) -> String {
    src.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\0', "\u{fffd}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_line_endings_and_nul() {
        assert_eq!(normalize("a\r\nb\rc\0"), "a\nb\nc\u{fffd}");
    }

    #[test]
    fn references_resolve_across_blocks() {
        let parser = MarkdownParser::default();
        let mut env = Env::default();
        let tokens = parser.parse_with_env("[home]\n\n[home]: /index \"Home\"\n", &mut env);

        assert_eq!(env.references.len(), 1);
        let link = &tokens[1].children[0];
        assert_eq!(link.kind, TokenKind::LinkOpen);
        assert_eq!(link.attr("href"), Some("/index"));
        assert_eq!(link.attr("title"), Some("Home"));
    }

    #[test]
    fn parse_inline_has_no_blocks() {
        let parser = MarkdownParser::default();
        let tokens = parser.parse_inline("# {{ x }}", &Env::default());
        assert_eq!(tokens[0].kind, TokenKind::Text);
        assert_eq!(tokens[0].content, "# ");
        assert_eq!(tokens[1].kind, TokenKind::LiquidOpen);
    }
}
