//! Token stream to document tree.
//!
//! Each token kind maps to a [`TokenSpec`]: it opens/closes a block node,
//! adds a leaf node, or opens/closes a mark. Template tags arrive as
//! `liquid_open` / text / `liquid_close` and become text carrying
//! [`Mark::Liquid`].

mod state;

use log::debug;

use liquidmark_syntax::{MarkdownParser, Nesting, ParserOptions, Token, TokenKind};

use crate::error::EngineError;
use crate::models::{Mark, MarkType, Node, NodeKind};
use state::ParseState;

/// How a token kind is turned into document structure.
enum TokenSpec {
    /// Open/close pair wrapping a block node. `no_close` blocks are a single
    /// token whose content becomes the node's text.
    Block {
        kind: fn(&Token, &[Token], usize) -> NodeKind,
        no_close: bool,
    },
    /// Leaf node
    Node(fn(&Token) -> NodeKind),
    /// Open/close pair toggling a mark. `no_close` marks wrap the token's
    /// content.
    Mark {
        mark: fn(&Token) -> Mark,
        mark_type: MarkType,
        no_close: bool,
    },
    Text,
    Inline,
    Softbreak,
}

fn spec_for(kind: TokenKind) -> TokenSpec {
    use TokenKind as K;

    let block = |kind: fn(&Token, &[Token], usize) -> NodeKind| TokenSpec::Block {
        kind,
        no_close: false,
    };
    let mark = |mark: fn(&Token) -> Mark, mark_type| TokenSpec::Mark {
        mark,
        mark_type,
        no_close: false,
    };

    match kind {
        K::BlockquoteOpen | K::BlockquoteClose => block(|_, _, _| NodeKind::Blockquote),
        K::ParagraphOpen | K::ParagraphClose => block(|_, _, _| NodeKind::Paragraph),
        K::ListItemOpen | K::ListItemClose => block(|_, _, _| NodeKind::ListItem),
        K::BulletListOpen | K::BulletListClose => block(|_, tokens, i| NodeKind::BulletList {
            tight: list_is_tight(tokens, i),
        }),
        K::OrderedListOpen | K::OrderedListClose => block(|token, tokens, i| {
            NodeKind::OrderedList {
                order: token
                    .attr("start")
                    .and_then(|start| start.parse().ok())
                    .filter(|&start| start != 0)
                    .unwrap_or(1),
                tight: list_is_tight(tokens, i),
            }
        }),
        K::HeadingOpen | K::HeadingClose => block(|token, _, _| NodeKind::Heading {
            level: token.tag[1..].parse().unwrap_or(1),
        }),
        K::CodeBlock => TokenSpec::Block {
            kind: |_, _, _| NodeKind::CodeBlock {
                params: String::new(),
            },
            no_close: true,
        },
        K::Fence => TokenSpec::Block {
            kind: |token, _, _| NodeKind::CodeBlock {
                params: token.info.clone(),
            },
            no_close: true,
        },
        K::Hr => TokenSpec::Node(|_| NodeKind::HorizontalRule),
        K::Hardbreak => TokenSpec::Node(|_| NodeKind::HardBreak),
        K::Image => TokenSpec::Node(|token| NodeKind::Image {
            src: token.attr("src").unwrap_or_default().to_string(),
            alt: token
                .children
                .first()
                .map(|child| child.content.clone())
                .filter(|alt| !alt.is_empty()),
            title: non_empty_attr(token, "title"),
        }),
        K::LiquidOpen | K::LiquidClose => mark(|_| Mark::Liquid, MarkType::Liquid),
        K::EmOpen | K::EmClose => mark(|_| Mark::Em, MarkType::Em),
        K::StrongOpen | K::StrongClose => mark(|_| Mark::Strong, MarkType::Strong),
        K::LinkOpen | K::LinkClose => mark(
            |token| Mark::Link {
                href: token.attr("href").unwrap_or_default().to_string(),
                title: non_empty_attr(token, "title"),
            },
            MarkType::Link,
        ),
        K::CodeInline => TokenSpec::Mark {
            mark: |_| Mark::Code,
            mark_type: MarkType::Code,
            no_close: true,
        },
        K::Text => TokenSpec::Text,
        K::Inline => TokenSpec::Inline,
        K::Softbreak => TokenSpec::Softbreak,
    }
}

fn non_empty_attr(token: &Token, name: &str) -> Option<String> {
    token
        .attr(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// A list is tight when its first item's first paragraph is hidden.
fn list_is_tight(tokens: &[Token], index: usize) -> bool {
    tokens[index + 1..]
        .iter()
        .find(|token| token.kind != TokenKind::ListItemOpen)
        .is_some_and(|token| token.hidden)
}

fn without_trailing_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

fn parse_tokens(state: &mut ParseState, tokens: &[Token]) -> Result<(), EngineError> {
    for (index, token) in tokens.iter().enumerate() {
        match spec_for(token.kind) {
            TokenSpec::Block { kind, no_close } => {
                if no_close {
                    state.open_node(kind(token, tokens, index));
                    state.add_text(without_trailing_newline(&token.content));
                    state.close_node(token.kind.name())?;
                } else if token.nesting == Nesting::Close {
                    state.close_node(token.kind.name())?;
                } else {
                    state.open_node(kind(token, tokens, index));
                }
            }
            TokenSpec::Node(kind) => state.add_node(kind(token)),
            TokenSpec::Mark {
                mark,
                mark_type,
                no_close,
            } => {
                if no_close {
                    state.open_mark(mark(token));
                    state.add_text(&token.content);
                    state.close_mark(mark_type);
                } else if token.nesting == Nesting::Close {
                    state.close_mark(mark_type);
                } else {
                    state.open_mark(mark(token));
                }
            }
            TokenSpec::Text => state.add_text(&token.content),
            TokenSpec::Inline => parse_tokens(state, &token.children)?,
            TokenSpec::Softbreak => state.add_text(" "),
        }
    }
    Ok(())
}

/// Build a document from a block token stream.
pub fn from_tokens(tokens: &[Token]) -> Result<Node, EngineError> {
    let mut state = ParseState::new();
    parse_tokens(&mut state, tokens)?;
    let doc = state.finish();
    debug!("document built: {} top-level blocks", doc.content.len());
    Ok(doc)
}

/// Markdown to document tree.
pub struct DocumentParser {
    tokenizer: MarkdownParser,
}

impl DocumentParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            tokenizer: MarkdownParser::new(options),
        }
    }

    pub fn tokenizer(&self) -> &MarkdownParser {
        &self.tokenizer
    }

    pub fn parse(&self, src: &str) -> Result<Node, EngineError> {
        from_tokens(&self.tokenizer.parse(src))
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}
