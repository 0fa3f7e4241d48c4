use crate::error::EngineError;
use crate::models::{Mark, MarkType, Node, NodeKind, push_inline};

/// A node under construction.
struct Frame {
    kind: NodeKind,
    content: Vec<Node>,
    /// Marks applied to inline content added to this frame
    marks: Vec<Mark>,
}

impl Frame {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            content: Vec::new(),
            marks: Vec::new(),
        }
    }

    fn build(self) -> Node {
        let mut content = self.content;
        if matches!(self.kind, NodeKind::Heading { .. }) {
            // headings hold text and images only
            content.retain(|node| !matches!(node.kind, NodeKind::HardBreak));
        }
        Node::with_content(self.kind, content)
    }
}

/// Stack of open nodes while walking a token stream.
pub(super) struct ParseState {
    root: Frame,
    stack: Vec<Frame>,
}

impl ParseState {
    pub fn new() -> Self {
        Self {
            root: Frame::new(NodeKind::Doc),
            stack: Vec::new(),
        }
    }

    fn top(&mut self) -> &mut Frame {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    pub fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let top = self.top();
        let node = Node::text(text, top.marks.clone());
        push_inline(&mut top.content, node);
    }

    pub fn open_mark(&mut self, mark: Mark) {
        let top = self.top();
        top.marks = mark.add_to_set(&top.marks);
    }

    pub fn close_mark(&mut self, mark_type: MarkType) {
        self.top().marks.retain(|mark| mark.mark_type() != mark_type);
    }

    /// Add a leaf node carrying the current marks.
    pub fn add_node(&mut self, kind: NodeKind) {
        let top = self.top();
        let mut node = Node::new(kind);
        if node.is_inline() {
            node.marks = top.marks.clone();
        }
        top.content.push(node);
    }

    pub fn open_node(&mut self, kind: NodeKind) {
        self.stack.push(Frame::new(kind));
    }

    /// Close the innermost open node, failing if only the document is open.
    pub fn close_node(&mut self, token: &'static str) -> Result<(), EngineError> {
        let frame = self
            .stack
            .pop()
            .ok_or(EngineError::UnexpectedClose(token))?;
        let node = frame.build();
        self.top().content.push(node);
        Ok(())
    }

    /// Close any nodes left open and return the document.
    pub fn finish(mut self) -> Node {
        while let Some(frame) = self.stack.pop() {
            let node = frame.build();
            self.top().content.push(node);
        }
        Node::doc(self.root.content)
    }
}
