//! Input rules that mark or restructure text as it is typed.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use super::{Patch, ensure_textblock, positioned, replace_range};
use crate::error::EngineError;
use crate::models::{Mark, Node, NodeKind};

/// Stand-in for leaf nodes in the text matched against rules
const LEAF_CHAR: char = '\u{fffc}';

/// How far back from the cursor rules look
const MAX_MATCH: usize = 500;

/// Re-mark text matching `pattern` (anchored at the cursor) with `mark`.
///
/// Capture group 1 receives the mark. An optional group 2 is kept as plain
/// text after it, for rules that fire on the character typed after the
/// closing delimiter.
pub struct InputRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub mark: Mark,
}

impl InputRule {
    fn new(name: &'static str, pattern: &str, mark: Mark) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Invalid input rule regex"),
            mark,
        }
    }
}

/// The editor's marking rules, tried in order.
pub fn default_rules() -> &'static [InputRule] {
    static RULES: OnceLock<Vec<InputRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            InputRule::new("expression", r"(\{\{.*\}\})$", Mark::Liquid),
            InputRule::new("strong", r"\*\*(.*)\*\*(.)$", Mark::Strong),
            InputRule::new("em", r"\*([^*]+)\*([^*])$", Mark::Em),
            InputRule::new("statement", r"^\s*(\{%.*%\})$", Mark::Liquid),
        ]
    })
}

/// What a [`BlockRule`] does to the text block it fires in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAction {
    /// Wrap the block in a container node
    Wrap(NodeKind),
    /// Turn the block into another kind of text block
    SetType(NodeKind),
}

/// Restructure a text block whose text before the cursor matches
/// `pattern`, which is anchored at the block start.
pub struct BlockRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub action: BlockAction,
}

impl BlockRule {
    fn new(name: &'static str, pattern: &str, action: BlockAction) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Invalid block rule regex"),
            action,
        }
    }
}

/// The editor's block rules, tried in order.
pub fn default_block_rules() -> &'static [BlockRule] {
    static RULES: OnceLock<Vec<BlockRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let heading = |level| BlockAction::SetType(NodeKind::Heading { level });
        vec![
            BlockRule::new("blockquote", r"^\s*>\s$", BlockAction::Wrap(NodeKind::Blockquote)),
            BlockRule::new(
                "bullet_list",
                r"^\s*(-|\*|\+)\s$",
                BlockAction::Wrap(NodeKind::BulletList { tight: false }),
            ),
            BlockRule::new("heading1", r"^\s*#\s$", heading(1)),
            BlockRule::new("heading2", r"^\s*##\s$", heading(2)),
            BlockRule::new("heading3", r"^\s*###\s$", heading(3)),
        ]
    })
}

/// Text of `block` before `cursor`, leaves replaced by U+FFFC, and the
/// position it starts at.
fn text_before(block: &Node, cursor: usize) -> (String, usize) {
    let from = cursor.saturating_sub(MAX_MATCH);
    let mut text = String::new();
    for (start, node) in positioned(&block.content) {
        let end = start + node.inline_size();
        if end <= from || start >= cursor {
            continue;
        }
        match node.as_text() {
            Some(content) => text.extend(
                content
                    .chars()
                    .skip(from.saturating_sub(start))
                    .take(cursor.min(end) - start.max(from)),
            ),
            None => text.push(LEAF_CHAR),
        }
    }
    (text, from)
}

/// Run [`default_rules`] against the text before `cursor`.
///
/// The first matching rule replaces the matched text with its group 1
/// carrying the rule's mark (and group 2, unmarked). Returns the range
/// that received the mark. Rules never fire in code blocks.
pub fn apply_input_rules(block: &mut Node, cursor: usize) -> Result<Option<Patch>, EngineError> {
    ensure_textblock(block)?;
    super::ensure_position(block, cursor)?;
    if block.is_code() {
        return Ok(None);
    }

    let (before, offset) = text_before(block, cursor);

    for rule in default_rules() {
        let Some(caps) = rule.pattern.captures(&before) else {
            continue;
        };
        let (Some(whole), Some(marked)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.as_str().contains(LEAF_CHAR) {
            continue;
        }

        let start = offset + before[..whole.start()].chars().count();
        let marked_len = marked.as_str().chars().count();
        let mut nodes = vec![Node::text(marked.as_str(), vec![rule.mark.clone()])];
        if let Some(after) = caps.get(2) {
            nodes.push(Node::text(after.as_str(), Vec::new()));
        }
        let new_end = start + nodes.iter().map(Node::inline_size).sum::<usize>();

        debug!("input rule `{}` marked {:?}", rule.name, marked.as_str());
        replace_range(block, start..cursor, nodes)?;
        return Ok(Some(Patch {
            changed: start..start + marked_len,
            new_selection: new_end..new_end,
        }));
    }

    Ok(None)
}

/// Run [`default_block_rules`] against the text before `cursor`.
///
/// The matched text is removed and the block is wrapped or retyped.
/// Returns the node that replaces `block` in its parent. The cursor then
/// sits at the start of the (possibly wrapped) text block. Bullet lists
/// only wrap paragraphs, since a list item starts with one.
pub fn apply_block_rules(block: &Node, cursor: usize) -> Result<Option<Node>, EngineError> {
    ensure_textblock(block)?;
    super::ensure_position(block, cursor)?;
    if block.is_code() {
        return Ok(None);
    }

    let (before, offset) = text_before(block, cursor);
    if offset != 0 {
        return Ok(None);
    }

    for rule in default_block_rules() {
        if !rule.pattern.is_match(&before) {
            continue;
        }
        let mut inner = block.clone();
        let node = match &rule.action {
            BlockAction::Wrap(kind @ NodeKind::BulletList { .. }) => {
                if inner.kind != NodeKind::Paragraph {
                    continue;
                }
                replace_range(&mut inner, 0..cursor, Vec::new())?;
                let item = Node::with_content(NodeKind::ListItem, vec![inner]);
                Node::with_content(kind.clone(), vec![item])
            }
            BlockAction::Wrap(kind) => {
                replace_range(&mut inner, 0..cursor, Vec::new())?;
                Node::with_content(kind.clone(), vec![inner])
            }
            BlockAction::SetType(kind) => {
                replace_range(&mut inner, 0..cursor, Vec::new())?;
                Node {
                    kind: kind.clone(),
                    ..inner
                }
            }
        };
        debug!("block rule `{}` fired", rule.name);
        return Ok(Some(node));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn para(text: &str) -> Node {
        Node::paragraph(vec![Node::text(text, vec![])])
    }

    fn size(text: &str) -> usize {
        text.chars().count()
    }

    #[test]
    fn expression_is_marked() {
        let mut block = para("Hello {{ name }}");
        let patch = apply_input_rules(&mut block, 16).unwrap().unwrap();
        assert_eq!(patch.changed, 6..16);
        assert_eq!(
            block.content,
            vec![
                Node::text("Hello ", vec![]),
                Node::text("{{ name }}", vec![Mark::Liquid]),
            ]
        );
    }

    #[test]
    fn statement_must_fill_the_line() {
        let mut block = para("  {% if x %}");
        let patch = apply_input_rules(&mut block, 12).unwrap().unwrap();
        // leading whitespace is part of the match and is replaced
        assert_eq!(patch.changed, 0..10);
        assert_eq!(block.content, vec![Node::text("{% if x %}", vec![Mark::Liquid])]);

        let mut inline = para("a {% if x %}");
        assert_eq!(apply_input_rules(&mut inline, 12).unwrap(), None);
    }

    #[rstest]
    #[case("a **b**c", Mark::Strong, "b")]
    #[case("a *b*c", Mark::Em, "b")]
    fn emphasis_rules_keep_trailing_char(#[case] text: &str, #[case] mark: Mark, #[case] inner: &str) {
        let mut block = para(text);
        apply_input_rules(&mut block, size(text)).unwrap().unwrap();
        assert_eq!(
            block.content,
            vec![
                Node::text("a ", vec![]),
                Node::text(inner, vec![mark]),
                Node::text("c", vec![]),
            ]
        );
    }

    #[test]
    fn only_text_before_cursor_counts() {
        let mut block = para("{{ x }} tail");
        assert_eq!(apply_input_rules(&mut block, 12).unwrap(), None);
        assert!(apply_input_rules(&mut block, 7).unwrap().is_some());
    }

    #[test]
    fn no_rules_in_code() {
        let mut code = Node::with_content(
            NodeKind::CodeBlock {
                params: String::new(),
            },
            vec![Node::text("{{ x }}", vec![])],
        );
        assert_eq!(apply_input_rules(&mut code, 7).unwrap(), None);
    }

    #[test]
    fn leaves_are_not_swallowed() {
        let mut block = Node::paragraph(vec![
            Node::text("{{ a ", vec![]),
            Node::new(NodeKind::HardBreak),
            Node::text(" }}", vec![]),
        ]);
        assert_eq!(apply_input_rules(&mut block, 9).unwrap(), None);
    }

    #[rstest]
    #[case("# ", 1)]
    #[case("## ", 2)]
    #[case("  ### ", 3)]
    fn hash_prefix_makes_heading(#[case] prefix: &str, #[case] level: u8) {
        let block = para(&format!("{prefix}Title"));
        let node = apply_block_rules(&block, size(prefix)).unwrap().unwrap();
        assert_eq!(
            node,
            Node::with_content(NodeKind::Heading { level }, vec![Node::text("Title", vec![])])
        );
    }

    #[test]
    fn quote_prefix_wraps_block() {
        let node = apply_block_rules(&para("> a"), 2).unwrap().unwrap();
        assert_eq!(
            node,
            Node::with_content(NodeKind::Blockquote, vec![para("a")])
        );
    }

    #[rstest]
    #[case("- ")]
    #[case("* ")]
    #[case("+ ")]
    fn bullet_prefix_starts_list(#[case] prefix: &str) {
        let node = apply_block_rules(&para(prefix), 2).unwrap().unwrap();
        let item = Node::with_content(NodeKind::ListItem, vec![Node::paragraph(vec![])]);
        assert_eq!(
            node,
            Node::with_content(NodeKind::BulletList { tight: false }, vec![item])
        );
    }

    #[test]
    fn block_rules_need_the_whole_prefix() {
        assert_eq!(apply_block_rules(&para("a # "), 4).unwrap(), None);
        assert_eq!(apply_block_rules(&para("#### "), 5).unwrap(), None);
        // the space must be the last thing typed
        assert_eq!(apply_block_rules(&para("# a"), 3).unwrap(), None);
    }

    #[test]
    fn headings_do_not_become_lists() {
        let heading = Node::with_content(
            NodeKind::Heading { level: 2 },
            vec![Node::text("- ", vec![])],
        );
        assert_eq!(apply_block_rules(&heading, 2).unwrap(), None);
    }

    #[test]
    fn no_block_rules_in_code() {
        let code = Node::with_content(
            NodeKind::CodeBlock {
                params: String::new(),
            },
            vec![Node::text("# ", vec![])],
        );
        assert_eq!(apply_block_rules(&code, 2).unwrap(), None);
    }
}
