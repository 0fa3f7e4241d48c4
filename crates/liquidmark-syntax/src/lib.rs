//! # liquidmark-syntax
//!
//! A CommonMark tokenizer that understands [Liquid]-style template tags.
//!
//! [Liquid]: https://shopify.github.io/liquid/
//!
//! ## Template tags
//!
//! Two tag forms are recognized anywhere inline text is parsed:
//!
//! - `{{ expression }}` output tags
//! - `{% statement %}` logic tags
//!
//! A tag is kept as one opaque unit. Markdown syntax inside it is never
//! interpreted, so `{{ a*b*c }}` does not produce emphasis and
//! `{% if x_y_z %}` keeps its underscores. Tags may also be used as link
//! destinations: `[Docs]({{ docs_url }})` yields a link whose `href` is the
//! tag text, verbatim.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source → normalize → Block pass → block tokens + Env (references)
//!                                       │
//!                        inline tokens  ▼
//!                      Inline pass (rule chain) → delimiter balancing
//!                                               → fragments join
//! ```
//!
//! ### 1. Block pass ([`parser`] module)
//!
//! Lines are classified and grouped into paragraphs, headings, block
//! quotes, lists, code blocks and thematic breaks. Paragraph and heading
//! text is left in `inline` tokens. Link reference definitions are removed
//! from paragraphs and collected in [`Env`].
//!
//! ### 2. Inline pass ([`parser::inline`] module)
//!
//! An ordered [`parser::ruler::Ruler`] of rules is tried at each position.
//! The `liquid` rule sits right after `emphasis`, and the `link` rule
//! accepts tag destinations. Unclaimed characters accumulate as text.
//! The [`lexer`] lets the text rule skip plain runs in one step.
//!
//! ### 3. Post-processing
//!
//! `*`/`_` delimiter runs are balanced per link scope, then turned into
//! `em`/`strong` tokens. Adjacent text tokens are merged.
//!
//! ## Module Structure
//!
//! ```text
//! liquidmark-syntax/
//! ├── lib.rs            # Public API
//! ├── token.rs          # Token, TokenKind, dump_tokens
//! ├── tag.rs            # Template tag delimiters and scanning
//! ├── lexer.rs          # Logos text-run lexer
//! ├── helpers/          # Link destination/label/title, escapes, URLs
//! └── parser/
//!     ├── mod.rs        # MarkdownParser, ParserOptions, Env
//!     ├── ruler.rs      # InlineRule trait and rule chain
//!     ├── state.rs      # Inline state and delimiter bookkeeping
//!     ├── reference.rs  # Link reference definitions
//!     ├── block/        # Line classification and block driver
//!     └── inline/       # One file per inline rule, post-processing
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use liquidmark_syntax::{TokenKind, parse};
//!
//! let tokens = parse("Hello *{{ name }}*\n");
//! assert_eq!(tokens[1].kind, TokenKind::Inline);
//!
//! let inline = &tokens[1].children;
//! assert_eq!(inline[1].kind, TokenKind::EmOpen);
//! assert_eq!(inline[2].kind, TokenKind::LiquidOpen);
//! assert_eq!(inline[3].content, "{{ name }}");
//! ```

pub mod helpers;
pub mod lexer;
pub mod parser;
pub mod tag;
pub mod token;

pub use parser::{Env, MarkdownParser, ParserOptions, Reference};
pub use tag::{TagKind, TemplateTag};
pub use token::{Nesting, Token, TokenKind, dump_tokens};

/// Parse `src` with default options.
pub fn parse(src: &str) -> Vec<Token> {
    MarkdownParser::default().parse(src)
}
