//! Tokens produced by the block and inline passes.
//!
//! The token stream is flat: container structure is expressed through
//! [`Nesting`] (an `Open` token, its content, a matching `Close` token).
//! Block-level [`TokenKind::Inline`] tokens carry their parsed inline
//! tokens in [`Token::children`].

use std::fmt::Write;
use std::ops::Range;

/// Every kind of token the parser can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Inline ===
    Text,
    Softbreak,
    Hardbreak,
    CodeInline,
    EmOpen,
    EmClose,
    StrongOpen,
    StrongClose,
    LinkOpen,
    LinkClose,
    Image,
    /// Opens a template tag span
    LiquidOpen,
    /// Closes a template tag span
    LiquidClose,

    // === Block ===
    /// Inline content container, parsed into `children`
    Inline,
    ParagraphOpen,
    ParagraphClose,
    HeadingOpen,
    HeadingClose,
    BlockquoteOpen,
    BlockquoteClose,
    BulletListOpen,
    BulletListClose,
    OrderedListOpen,
    OrderedListClose,
    ListItemOpen,
    ListItemClose,
    Fence,
    CodeBlock,
    Hr,
}

impl TokenKind {
    /// Stable snake_case name of the token type.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Text => "text",
            TokenKind::Softbreak => "softbreak",
            TokenKind::Hardbreak => "hardbreak",
            TokenKind::CodeInline => "code_inline",
            TokenKind::EmOpen => "em_open",
            TokenKind::EmClose => "em_close",
            TokenKind::StrongOpen => "strong_open",
            TokenKind::StrongClose => "strong_close",
            TokenKind::LinkOpen => "link_open",
            TokenKind::LinkClose => "link_close",
            TokenKind::Image => "image",
            TokenKind::LiquidOpen => "liquid_open",
            TokenKind::LiquidClose => "liquid_close",
            TokenKind::Inline => "inline",
            TokenKind::ParagraphOpen => "paragraph_open",
            TokenKind::ParagraphClose => "paragraph_close",
            TokenKind::HeadingOpen => "heading_open",
            TokenKind::HeadingClose => "heading_close",
            TokenKind::BlockquoteOpen => "blockquote_open",
            TokenKind::BlockquoteClose => "blockquote_close",
            TokenKind::BulletListOpen => "bullet_list_open",
            TokenKind::BulletListClose => "bullet_list_close",
            TokenKind::OrderedListOpen => "ordered_list_open",
            TokenKind::OrderedListClose => "ordered_list_close",
            TokenKind::ListItemOpen => "list_item_open",
            TokenKind::ListItemClose => "list_item_close",
            TokenKind::Fence => "fence",
            TokenKind::CodeBlock => "code_block",
            TokenKind::Hr => "hr",
        }
    }
}

/// How a token affects nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// Opens a container; a matching `Close` follows.
    Open,
    /// Self-contained token.
    SelfClosing,
    /// Closes the innermost open container.
    Close,
}

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// HTML element name associated with the token (`p`, `h2`, `a`, `liquid`, ...)
    pub tag: &'static str,
    pub nesting: Nesting,
    /// Attributes such as `href`, `title`, `src`, `start`
    pub attrs: Vec<(String, String)>,
    /// Text content (text, code, fences, inline source)
    pub content: String,
    /// Source markers that produced this token (`*`, `**`, `` ` ``, `{{`, ...)
    pub markup: String,
    /// Fence info string, ordered list item number, or tag kind
    pub info: String,
    /// Nesting level within its token stream
    pub level: usize,
    /// Inline tokens of an `Inline` token, or alt text tokens of an `Image`
    pub children: Vec<Token>,
    /// Set on paragraphs inside tight lists
    pub hidden: bool,
    /// Byte range in the inline buffer this token was read from.
    ///
    /// Only set where the exact source slice matters: the text token of a
    /// template tag.
    pub span: Option<Range<usize>>,
}

impl Token {
    pub fn new(kind: TokenKind, tag: &'static str, nesting: Nesting) -> Self {
        Self {
            kind,
            tag,
            nesting,
            attrs: Vec::new(),
            content: String::new(),
            markup: String::new(),
            info: String::new(),
            level: 0,
            children: Vec::new(),
            hidden: false,
            span: None,
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }
}

/// Render a token stream as an indented tree, one token per line.
///
/// Used by the CLI's `tokens` command and by tests. Content is shown
/// debug-quoted, attributes as `name="value"`.
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    dump_into(&mut out, tokens, 0);
    out
}

fn dump_into(out: &mut String, tokens: &[Token], depth: usize) {
    let mut depth = depth;
    for token in tokens {
        if token.nesting == Nesting::Close {
            depth = depth.saturating_sub(1);
        }

        out.push_str(&"  ".repeat(depth));
        out.push_str(token.kind.name());
        for (name, value) in &token.attrs {
            let _ = write!(out, " {name}={value:?}");
        }
        if !token.content.is_empty() && token.kind != TokenKind::Inline {
            let _ = write!(out, " {:?}", token.content);
        }
        out.push('\n');

        if !token.children.is_empty() {
            dump_into(out, &token.children, depth + 1);
        }

        if token.nesting == Nesting::Open {
            depth += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_attr_replaces_existing_value() {
        let mut token = Token::new(TokenKind::LinkOpen, "a", Nesting::Open);
        token.set_attr("href", "a");
        token.set_attr("href", "b");
        assert_eq!(token.attrs, vec![("href".to_string(), "b".to_string())]);
        assert_eq!(token.attr("href"), Some("b"));
        assert_eq!(token.attr("title"), None);
    }

    #[test]
    fn dump_indents_by_nesting() {
        let mut text = Token::new(TokenKind::Text, "", Nesting::SelfClosing);
        text.content = "{{ name }}".to_string();
        let tokens = vec![
            Token::new(TokenKind::LiquidOpen, "liquid", Nesting::Open),
            text,
            Token::new(TokenKind::LiquidClose, "liquid", Nesting::Close),
        ];

        assert_eq!(
            dump_tokens(&tokens),
            "liquid_open\n  text \"{{ name }}\"\nliquid_close\n"
        );
    }

    #[test]
    fn token_names_are_snake_case() {
        assert_eq!(TokenKind::LiquidOpen.name(), "liquid_open");
        assert_eq!(TokenKind::BulletListClose.name(), "bullet_list_close");
        assert_eq!(TokenKind::CodeInline.name(), "code_inline");
    }
}
