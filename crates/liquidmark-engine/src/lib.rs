//! # liquidmark-engine
//!
//! Document model on top of the [`liquidmark_syntax`] token stream.
//!
//! ```text
//! Markdown → tokens → parsing → Node tree → serializer → Markdown
//!                                        └→ html       → HTML
//! ```
//!
//! Template tags are text carrying [`Mark::Liquid`]. The mark is not
//! inclusive, does not span adjacent nodes in HTML, and is written back
//! verbatim by the serializer, so a tag survives a parse/serialize round
//! trip byte for byte.

pub mod editing;
pub mod error;
pub mod html;
pub mod models;
pub mod parsing;
pub mod serializer;

pub use error::EngineError;
pub use html::to_html;
pub use models::{Mark, MarkSpec, MarkType, Node, NodeKind};
pub use parsing::{DocumentParser, from_tokens};
pub use serializer::{MarkdownSerializer, SerializerOptions, to_markdown};
