/*!
 * # Text block editing
 *
 * Helpers that edit the inline content of one text block (paragraph,
 * heading or code block) the way the editor does while typing.
 *
 * ## Positions
 *
 * Positions are inline offsets inside the block: every character of a
 * text node counts one, every leaf node (image, hard break) counts one.
 * Position `0` is before the first inline node.
 *
 * ## Template tags
 *
 * The tag mark is not inclusive: text typed right after a tag does not
 * become part of it. [`input_rules`] turn `{{ ... }}` and `{% ... %}` typed
 * as plain text into tag-marked text, and [`tag_at`] / [`replace_with_tag`]
 * support an "edit tag" dialog.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use liquidmark_engine::editing::{apply_input_rules, insert_text};
 * use liquidmark_engine::{Mark, Node};
 *
 * let mut block = Node::paragraph(vec![Node::text("Hi ", vec![])]);
 * insert_text(&mut block, 3, "{{ name }}").unwrap();
 *
 * let patch = apply_input_rules(&mut block, 13).unwrap().unwrap();
 * assert_eq!(patch.changed, 3..13);
 * assert_eq!(block.content[1].marks, vec![Mark::Liquid]);
 * ```
 */

pub mod input_rules;
pub mod patch;

use std::ops::Range;

use log::trace;

use crate::error::EngineError;
use crate::models::{Mark, MarkType, Node, NodeKind, push_inline};
use crate::parsing::DocumentParser;

pub use input_rules::{
    BlockAction, BlockRule, InputRule, apply_block_rules, apply_input_rules, default_block_rules,
    default_rules,
};
pub use patch::Patch;

/// A template tag found in a text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    pub range: Range<usize>,
    pub raw: String,
}

fn ensure_textblock(block: &Node) -> Result<(), EngineError> {
    if block.is_textblock() {
        Ok(())
    } else {
        Err(EngineError::NotTextblock(block.kind.name()))
    }
}

fn ensure_position(block: &Node, pos: usize) -> Result<(), EngineError> {
    let size = block.content_size();
    if pos > size {
        return Err(EngineError::PositionOutOfRange { pos, size });
    }
    Ok(())
}

/// Inline nodes with their start positions.
fn positioned(content: &[Node]) -> impl Iterator<Item = (usize, &Node)> {
    content.iter().scan(0, |pos, node| {
        let start = *pos;
        *pos += node.inline_size();
        Some((start, node))
    })
}

/// Characters `from..to` of `text`.
fn char_slice(text: &str, from: usize, to: usize) -> &str {
    let byte = |n: usize| {
        text.char_indices()
            .nth(n)
            .map_or(text.len(), |(index, _)| index)
    };
    &text[byte(from)..byte(to)]
}

/// The part of `content` between inline positions `from` and `to`.
fn slice_content(content: &[Node], from: usize, to: usize) -> Vec<Node> {
    let mut out = Vec::new();
    for (start, node) in positioned(content) {
        let end = start + node.inline_size();
        if end <= from || start >= to {
            continue;
        }
        match node.as_text() {
            Some(text) => {
                let lo = from.saturating_sub(start);
                let hi = to.min(end) - start;
                push_inline(&mut out, node.with_text(char_slice(text, lo, hi)));
            }
            None => out.push(node.clone()),
        }
    }
    out
}

/// Replace positions `range` of a text block with `nodes`, merging
/// adjacent text with equal marks.
pub fn replace_range(
    block: &mut Node,
    range: Range<usize>,
    nodes: Vec<Node>,
) -> Result<(), EngineError> {
    ensure_textblock(block)?;
    ensure_position(block, range.end)?;
    if range.start > range.end {
        return Err(EngineError::PositionOutOfRange {
            pos: range.start,
            size: range.end,
        });
    }

    let size = block.content_size();
    let mut content = slice_content(&block.content, 0, range.start);
    for node in nodes.into_iter().chain(slice_content(&block.content, range.end, size)) {
        let node = if block.is_code() {
            Node { marks: Vec::new(), ..node }
        } else {
            node
        };
        push_inline(&mut content, node);
    }
    block.content = content;
    Ok(())
}

/// Marks that text typed at `pos` receives.
///
/// Inside a text node this is the node's marks. At a boundary the marks of
/// the node before are used (the node after at the very start), minus any
/// non-inclusive mark the node on the other side does not share.
pub fn marks_at(block: &Node, pos: usize) -> Result<Vec<Mark>, EngineError> {
    ensure_position(block, pos)?;

    let mut before = None;
    let mut after = None;
    for (start, node) in positioned(&block.content) {
        let end = start + node.inline_size();
        if start < pos && pos < end {
            return Ok(node.marks.clone());
        }
        if end == pos {
            before = Some(node);
        }
        if start == pos && after.is_none() {
            after = Some(node);
        }
    }

    let (main, other) = match (before, after) {
        (Some(main), other) => (main, other),
        (None, Some(main)) => (main, None),
        (None, None) => return Ok(Vec::new()),
    };

    Ok(main
        .marks
        .iter()
        .filter(|mark| mark.spec().inclusive || other.is_some_and(|o| mark.is_in_set(&o.marks)))
        .cloned()
        .collect())
}

/// Insert `text` at `pos` with the marks [`marks_at`] gives.
pub fn insert_text(block: &mut Node, pos: usize, text: &str) -> Result<Patch, EngineError> {
    ensure_textblock(block)?;
    let marks = marks_at(block, pos)?;
    trace!("insert {text:?} at {pos} with {} marks", marks.len());
    replace_range(block, pos..pos, vec![Node::text(text, marks)])?;
    Ok(Patch::inserted(pos, text.chars().count()))
}

/// The tag-marked text at `pos`, for pre-filling an "edit tag" dialog.
///
/// A cursor right after a tag still finds it.
pub fn tag_at(block: &Node, pos: usize) -> Result<Option<TagSpan>, EngineError> {
    ensure_position(block, pos)?;
    let found = positioned(&block.content)
        .filter(|(_, node)| node.marks.iter().any(|m| m.mark_type() == MarkType::Liquid))
        .find_map(|(start, node)| {
            let end = start + node.inline_size();
            let text = node.as_text()?;
            (start <= pos && pos <= end).then(|| TagSpan {
                range: start..end,
                raw: text.to_string(),
            })
        });
    Ok(found)
}

/// Replace `range` with the inline content of `raw` parsed as Markdown, so
/// a tag typed into the dialog arrives as tag-marked text.
///
/// Nothing changes when `raw` is empty or does not start with a text block.
pub fn replace_with_tag(
    block: &mut Node,
    range: Range<usize>,
    raw: &str,
    parser: &DocumentParser,
) -> Result<Option<Patch>, EngineError> {
    ensure_textblock(block)?;
    ensure_position(block, range.end)?;
    if raw.is_empty() {
        return Ok(None);
    }

    let doc = parser.parse(raw)?;
    let Some(first) = doc.content.into_iter().next().filter(Node::is_textblock) else {
        return Ok(None);
    };
    let inserted: usize = first.content.iter().map(Node::inline_size).sum();
    if inserted == 0 {
        return Ok(None);
    }

    let start = range.start;
    replace_range(block, range, first.content)?;
    Ok(Some(Patch::inserted(start, inserted)))
}

/// Whether `node` is a text block whose content can hold marks.
pub fn allows_marks(node: &Node) -> bool {
    node.is_textblock() && !matches!(node.kind, NodeKind::CodeBlock { .. })
}
