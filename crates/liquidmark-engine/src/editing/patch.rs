use std::ops::Range;

/// Result of an edit to a text block, in inline positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Range now holding the inserted or re-marked content
    pub changed: Range<usize>,
    /// Where the cursor/selection ends up
    pub new_selection: Range<usize>,
}

impl Patch {
    /// Patch for content inserted at `start`, with the cursor after it.
    pub fn inserted(start: usize, len: usize) -> Self {
        let end = start + len;
        Self {
            changed: start..end,
            new_selection: end..end,
        }
    }
}
