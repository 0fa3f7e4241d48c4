use std::fmt::Write;

use super::mark::Mark;

/// What a [`Node`] is, with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Blockquote,
    HorizontalRule,
    Heading { level: u8 },
    CodeBlock { params: String },
    OrderedList { order: u32, tight: bool },
    BulletList { tight: bool },
    ListItem,
    Text(String),
    Image {
        src: String,
        alt: Option<String>,
        title: Option<String>,
    },
    HardBreak,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Blockquote => "blockquote",
            NodeKind::HorizontalRule => "horizontal_rule",
            NodeKind::Heading { .. } => "heading",
            NodeKind::CodeBlock { .. } => "code_block",
            NodeKind::OrderedList { .. } => "ordered_list",
            NodeKind::BulletList { .. } => "bullet_list",
            NodeKind::ListItem => "list_item",
            NodeKind::Text(_) => "text",
            NodeKind::Image { .. } => "image",
            NodeKind::HardBreak => "hard_break",
        }
    }
}

/// A document tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub content: Vec<Node>,
    /// Marks of an inline node, sorted by rank
    pub marks: Vec<Mark>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            content: Vec::new(),
            marks: Vec::new(),
        }
    }

    /// Create a node with `content`, filling required content the way the
    /// schema demands: an empty document, block quote or list item gets an
    /// empty paragraph.
    pub fn with_content(kind: NodeKind, content: Vec<Node>) -> Self {
        let mut node = Self {
            kind,
            content,
            marks: Vec::new(),
        };
        node.fill();
        node
    }

    pub fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            kind: NodeKind::Text(text.into()),
            content: Vec::new(),
            marks,
        }
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::with_content(NodeKind::Paragraph, content)
    }

    pub fn doc(content: Vec<Node>) -> Self {
        Self::with_content(NodeKind::Doc, content)
    }

    fn fill(&mut self) {
        let needs_block = matches!(
            self.kind,
            NodeKind::Doc | NodeKind::Blockquote | NodeKind::ListItem
        );
        if needs_block && self.content.is_empty() {
            self.content.push(Node::new(NodeKind::Paragraph));
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Text(_) | NodeKind::Image { .. } | NodeKind::HardBreak
        )
    }

    /// Whether the node holds inline content directly.
    pub fn is_textblock(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Paragraph | NodeKind::Heading { .. } | NodeKind::CodeBlock { .. }
        )
    }

    pub fn is_code(&self) -> bool {
        matches!(self.kind, NodeKind::CodeBlock { .. })
    }

    /// Size of an inline node in editing positions: characters for text,
    /// one for leaves.
    pub fn inline_size(&self) -> usize {
        match &self.kind {
            NodeKind::Text(text) => text.chars().count(),
            _ => 1,
        }
    }

    /// Size of a text block's inline content.
    pub fn content_size(&self) -> usize {
        self.content.iter().map(Node::inline_size).sum()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let NodeKind::Text(text) = &self.kind {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }

    /// Same node with different text. Only meaningful for text nodes.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::text(text, self.marks.clone())
    }

    pub fn same_markup(&self, other: &Node) -> bool {
        self.marks == other.marks
    }

    /// Render the tree as indented text, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(self.kind.name());
        match &self.kind {
            NodeKind::Text(text) => {
                let _ = write!(out, " {text:?}");
            }
            NodeKind::Heading { level } => {
                let _ = write!(out, " level={level}");
            }
            NodeKind::CodeBlock { params } if !params.is_empty() => {
                let _ = write!(out, " params={params:?}");
            }
            NodeKind::OrderedList { order, tight } => {
                let _ = write!(out, " order={order} tight={tight}");
            }
            NodeKind::BulletList { tight } => {
                let _ = write!(out, " tight={tight}");
            }
            NodeKind::Image { src, alt, title } => {
                let _ = write!(out, " src={src:?}");
                if let Some(alt) = alt {
                    let _ = write!(out, " alt={alt:?}");
                }
                if let Some(title) = title {
                    let _ = write!(out, " title={title:?}");
                }
            }
            _ => {}
        }
        if !self.marks.is_empty() {
            let marks: Vec<String> = self.marks.iter().map(ToString::to_string).collect();
            let _ = write!(out, " [{}]", marks.join(", "));
        }
        out.push('\n');
        for child in &self.content {
            child.dump_into(out, depth + 1);
        }
    }
}

/// Append `node` to inline `content`, merging it into the previous text
/// node when both carry the same marks.
pub fn push_inline(content: &mut Vec<Node>, node: Node) {
    if let (Some(last), NodeKind::Text(text)) = (content.last_mut(), &node.kind)
        && last.same_markup(&node)
        && let NodeKind::Text(prev) = &mut last.kind
    {
        prev.push_str(text);
        return;
    }
    if node.as_text().is_some_and(str::is_empty) {
        return;
    }
    content.push(node);
}
