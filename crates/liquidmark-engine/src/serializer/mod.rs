//! Document tree to Markdown.
//!
//! Blocks are written through a line prefix (`delim`) so block quotes and
//! list items nest. Inline content is written mark by mark: marks shared by
//! adjacent nodes stay open, `em`/`strong` may be reordered to close in the
//! order they were opened, and whitespace at their edges is moved outside.
//!
//! Template tags (text with [`Mark::Liquid`](crate::models::Mark::Liquid))
//! are written verbatim: the mark has empty delimiters, is never reordered
//! and its text is not escaped. Link hrefs that are template tags are not
//! escaped either.

mod escape;
mod state;

use log::debug;

use crate::models::Node;
use state::SerializerState;

pub use escape::escape;

/// Serializer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerOptions {
    /// Write every list tight, regardless of how it was parsed
    pub tight_lists: bool,
    /// Bullet list marker
    pub bullet: char,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            tight_lists: false,
            bullet: '*',
        }
    }
}

/// Document to Markdown.
#[derive(Debug, Clone, Default)]
pub struct MarkdownSerializer {
    options: SerializerOptions,
}

impl MarkdownSerializer {
    pub fn new(options: SerializerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    /// Serialize `doc`. The output has no trailing newline.
    pub fn serialize(&self, doc: &Node) -> String {
        let mut state = SerializerState::new(&self.options);
        state.render_content(doc);
        debug!("serialized {} bytes", state.out.len());
        state.out
    }
}

/// Serialize with default options.
pub fn to_markdown(doc: &Node) -> String {
    MarkdownSerializer::default().serialize(doc)
}
