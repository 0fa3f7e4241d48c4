//! Block pass.
//!
//! Lines are classified one at a time ([`classify`]) and grouped into
//! blocks by a recursive driver. Container blocks (block quotes, list
//! items) strip their markers and feed the remaining lines back through
//! the driver.
//!
//! The output is the flat block token stream with unparsed `inline` tokens.

mod classify;

use log::trace;

use super::Env;
use super::reference::parse_definition;
use crate::helpers::unescape_all;
use crate::token::{Nesting, Token, TokenKind};
use classify::{
    FenceOpen, ListMarker, atx_heading, closes_fence, continues_paragraph, fence_open,
    interrupts_paragraph, is_blank, is_thematic_break, leading_indent, list_marker,
    remove_columns, setext_underline, strip_blockquote, strip_indent,
};

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

pub(super) fn parse(src: &str, env: &mut Env) -> Vec<Token> {
    let lines: Vec<String> = src.lines().map(str::to_string).collect();
    let mut parser = BlockParser {
        env,
        tokens: Vec::new(),
        level: 0,
    };
    parser.blocks(&lines);
    parser.tokens
}

struct BlockParser<'e> {
    env: &'e mut Env,
    tokens: Vec<Token>,
    level: usize,
}

/// Lines belonging to one list item.
struct ItemLines {
    content: Vec<String>,
    /// Index just past the last non-blank line of the item
    content_end: usize,
    /// Index just past the item including trailing blank lines
    next: usize,
}

impl BlockParser<'_> {
    fn push(&mut self, kind: TokenKind, tag: &'static str, nesting: Nesting) -> &mut Token {
        let mut token = Token::new(kind, tag, nesting);
        if nesting == Nesting::Close {
            self.level = self.level.saturating_sub(1);
        }
        token.level = self.level;
        if nesting == Nesting::Open {
            self.level += 1;
        }
        self.tokens.push(token);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    fn push_inline(&mut self, content: &str) {
        let token = self.push(TokenKind::Inline, "", Nesting::SelfClosing);
        token.content = content.to_string();
    }

    /// Parse `lines` as a sequence of blocks.
    ///
    /// Returns whether a blank line separates two of the blocks, which makes
    /// an enclosing list loose.
    fn blocks(&mut self, lines: &[String]) -> bool {
        let mut i = 0;
        let mut seen_block = false;
        let mut blank_pending = false;
        let mut blank_between = false;

        while i < lines.len() {
            if is_blank(&lines[i]) {
                blank_pending = seen_block;
                i += 1;
                continue;
            }
            if blank_pending {
                blank_between = true;
                blank_pending = false;
            }
            seen_block = true;
            i += self.block(&lines[i..]).max(1);
        }

        blank_between
    }

    /// Parse one block at the start of `lines`, returning the lines consumed.
    fn block(&mut self, lines: &[String]) -> usize {
        let line = &lines[0];

        if let Some(open) = fence_open(line) {
            return self.fence(lines, &open);
        }
        if leading_indent(line).0 >= 4 {
            return self.indented_code(lines);
        }
        if let Some((level, content)) = atx_heading(line) {
            self.heading(level, "#".repeat(level as usize), content);
            return 1;
        }
        if is_thematic_break(line) {
            let hr = self.push(TokenKind::Hr, "hr", Nesting::SelfClosing);
            hr.markup = line.trim().to_string();
            return 1;
        }
        if strip_blockquote(line).is_some() {
            return self.blockquote(lines);
        }
        if let Some(marker) = list_marker(line) {
            return self.list(lines, marker);
        }
        self.paragraph(lines)
    }

    fn heading(&mut self, level: u8, markup: String, content: &str) {
        let tag = HEADING_TAGS[(level as usize).clamp(1, 6) - 1];
        let open = self.push(TokenKind::HeadingOpen, tag, Nesting::Open);
        open.markup = markup.clone();
        self.push_inline(content);
        let close = self.push(TokenKind::HeadingClose, tag, Nesting::Close);
        close.markup = markup;
    }

    fn fence(&mut self, lines: &[String], open: &FenceOpen) -> usize {
        let mut content = String::new();
        let mut i = 1;
        let mut closed = false;

        while i < lines.len() {
            if closes_fence(&lines[i], open) {
                closed = true;
                i += 1;
                break;
            }
            content.push_str(&strip_indent(&lines[i], open.indent));
            content.push('\n');
            i += 1;
        }
        if !closed {
            trace!("unclosed code fence runs to end of container");
        }

        let token = self.push(TokenKind::Fence, "code", Nesting::SelfClosing);
        token.info = unescape_all(&open.info).into_owned();
        token.markup = (open.marker as char).to_string().repeat(open.len);
        token.content = content;
        i
    }

    fn indented_code(&mut self, lines: &[String]) -> usize {
        let mut end = 1;
        let mut i = 1;
        while i < lines.len() {
            if is_blank(&lines[i]) {
                i += 1;
            } else if leading_indent(&lines[i]).0 >= 4 {
                i += 1;
                end = i;
            } else {
                break;
            }
        }

        let mut content = lines[..end]
            .iter()
            .map(|line| strip_indent(line, 4))
            .collect::<Vec<_>>()
            .join("\n");
        content.push('\n');

        let token = self.push(TokenKind::CodeBlock, "code", Nesting::SelfClosing);
        token.content = content;
        end
    }

    fn blockquote(&mut self, lines: &[String]) -> usize {
        let mut inner = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];
            if let Some(stripped) = strip_blockquote(line) {
                inner.push(stripped);
                i += 1;
                continue;
            }
            if is_blank(line) {
                break;
            }
            // lazy continuation of a quoted paragraph
            let lazy = inner.last().is_some_and(|prev: &String| continues_paragraph(prev))
                && !interrupts_paragraph(line);
            if !lazy {
                break;
            }
            inner.push(line.clone());
            i += 1;
        }

        let open = self.push(TokenKind::BlockquoteOpen, "blockquote", Nesting::Open);
        open.markup = ">".to_string();
        self.blocks(&inner);
        let close = self.push(TokenKind::BlockquoteClose, "blockquote", Nesting::Close);
        close.markup = ">".to_string();
        i
    }

    fn list(&mut self, lines: &[String], first: ListMarker) -> usize {
        let list_start = self.tokens.len();
        let (open_kind, close_kind, tag) = if first.ordered {
            (TokenKind::OrderedListOpen, TokenKind::OrderedListClose, "ol")
        } else {
            (TokenKind::BulletListOpen, TokenKind::BulletListClose, "ul")
        };
        let markup = (first.marker as char).to_string();

        let open = self.push(open_kind, tag, Nesting::Open);
        open.markup = markup.clone();
        if first.ordered && first.start != 1 {
            open.set_attr("start", first.start.to_string());
        }
        let list_level = self.level - 1;

        let mut loose = false;
        let mut consumed = 0;
        let mut i = 0;

        while i < lines.len() {
            let Some(marker) = list_marker(&lines[i]) else {
                break;
            };
            if !first.same_list(&marker) || is_thematic_break(&lines[i]) {
                break;
            }

            let item = collect_item(lines, i, &marker);

            let open = self.push(TokenKind::ListItemOpen, "li", Nesting::Open);
            open.markup = markup.clone();
            if marker.ordered {
                open.info = marker.start.to_string();
            }
            if self.blocks(&item.content) {
                loose = true;
            }
            let close = self.push(TokenKind::ListItemClose, "li", Nesting::Close);
            close.markup = markup.clone();

            consumed = item.content_end;
            i = item.next;

            // a blank line between two items makes the list loose
            let separated = item.next > item.content_end;
            if separated
                && i < lines.len()
                && list_marker(&lines[i]).is_some_and(|next| first.same_list(&next))
            {
                loose = true;
            }
        }

        let close = self.push(close_kind, tag, Nesting::Close);
        close.markup = markup;

        if !loose {
            for token in &mut self.tokens[list_start..] {
                if token.level == list_level + 2
                    && matches!(
                        token.kind,
                        TokenKind::ParagraphOpen | TokenKind::ParagraphClose
                    )
                {
                    token.hidden = true;
                }
            }
        }
        trace!("list at level {list_level}: loose={loose}");

        consumed.max(1)
    }

    fn paragraph(&mut self, lines: &[String]) -> usize {
        let mut end = 1;
        let mut underline = None;

        while end < lines.len() {
            let line = &lines[end];
            if is_blank(line) {
                break;
            }
            if let Some(level) = setext_underline(line) {
                underline = Some(level);
                break;
            }
            if interrupts_paragraph(line) {
                break;
            }
            end += 1;
        }

        let mut text = lines[..end].join("\n");
        while let Some(definition) = parse_definition(&text) {
            self.env
                .references
                .entry(definition.label)
                .or_insert(definition.reference);
            text.drain(..definition.consumed);
        }

        let content = text.trim_matches([' ', '\t', '\n']);
        if content.is_empty() {
            return end;
        }

        if let Some(level) = underline {
            let markup = if level == 1 { "=" } else { "-" };
            self.heading(level, markup.to_string(), content);
            return end + 1;
        }

        self.push(TokenKind::ParagraphOpen, "p", Nesting::Open);
        self.push_inline(content);
        self.push(TokenKind::ParagraphClose, "p", Nesting::Close);
        end
    }
}

/// Gather the lines of the list item whose marker is on `lines[start]`.
fn collect_item(lines: &[String], start: usize, marker: &ListMarker) -> ItemLines {
    let mut content = Vec::new();
    if !marker.empty {
        content.push(remove_columns(&lines[start], marker.content_offset));
    }

    let mut j = start + 1;
    let mut content_end = j;

    while j < lines.len() {
        let line = &lines[j];
        if is_blank(line) {
            // an item may start with at most one blank line
            if content.is_empty() {
                break;
            }
            content.push(String::new());
            j += 1;
            continue;
        }

        if leading_indent(line).0 >= marker.content_offset {
            content.push(remove_columns(line, marker.content_offset));
        } else if content
            .last()
            .is_some_and(|prev| continues_paragraph(prev))
            && !interrupts_paragraph(line)
        {
            content.push(line.clone());
        } else {
            break;
        }
        j += 1;
        content_end = j;
    }

    while content.last().is_some_and(|line| is_blank(line)) {
        content.pop();
    }

    ItemLines {
        content,
        content_end,
        next: j,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::dump_tokens;
    use pretty_assertions::assert_eq;

    fn blocks(src: &str) -> Vec<Token> {
        let mut env = Env::default();
        parse(src, &mut env)
    }

    fn kinds(src: &str) -> Vec<&'static str> {
        blocks(src).iter().map(|t| t.kind.name()).collect()
    }

    #[test]
    fn headings() {
        let tokens = blocks("# One\n\nTwo\n===\n\nThree\n---\n");
        let tags: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::HeadingOpen)
            .map(|t| t.tag)
            .collect();
        assert_eq!(tags, vec!["h1", "h1", "h2"]);
        assert_eq!(tokens[1].content, "One");
        assert_eq!(tokens[4].content, "Two");
    }

    #[test]
    fn paragraph_lines_are_joined_and_trimmed() {
        let tokens = blocks("  first\n   second  \n");
        assert_eq!(tokens[1].content, "first\n   second");
    }

    #[test]
    fn fenced_code_keeps_tags_verbatim() {
        let tokens = blocks("```liquid\n{{ x }}\n  {% if %}\n```\nafter\n");
        assert_eq!(tokens[0].kind, TokenKind::Fence);
        assert_eq!(tokens[0].info, "liquid");
        assert_eq!(tokens[0].content, "{{ x }}\n  {% if %}\n");
        assert_eq!(tokens[2].content, "after");
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let tokens = blocks("~~~\na\n\nb");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].content, "a\n\nb\n");
    }

    #[test]
    fn indented_code_cannot_interrupt_paragraph() {
        assert_eq!(kinds("text\n    more\n"), vec!["paragraph_open", "inline", "paragraph_close"]);
        assert_eq!(kinds("    code\n\n    more\n"), vec!["code_block"]);
        assert_eq!(blocks("    code\n\n    more\n")[0].content, "code\n\nmore\n");
    }

    #[test]
    fn blockquote_with_lazy_line() {
        insta::assert_snapshot!(dump_tokens(&blocks("> quoted\nlazy\n\nout\n")), @r#"
        blockquote_open
          paragraph_open
            inline
          paragraph_close
        blockquote_close
        paragraph_open
          inline
        paragraph_close
        "#);
    }

    #[test]
    fn tight_list_hides_paragraphs() {
        let tokens = blocks("- a\n- b\n");
        let hidden: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::ParagraphOpen)
            .map(|t| t.hidden)
            .collect();
        assert_eq!(hidden, vec![true, true]);
    }

    #[test]
    fn loose_list_keeps_paragraphs() {
        for src in ["- a\n\n- b\n", "- a\n\n  b\n"] {
            let tokens = blocks(src);
            assert!(
                tokens
                    .iter()
                    .filter(|t| t.kind == TokenKind::ParagraphOpen)
                    .all(|t| !t.hidden),
                "{src:?} should be loose"
            );
        }
    }

    #[test]
    fn nested_list() {
        insta::assert_snapshot!(dump_tokens(&blocks("1. one\n   - inner\n2. two\n")), @r#"
        ordered_list_open
          list_item_open
            paragraph_open
              inline
            paragraph_close
            bullet_list_open
              list_item_open
                paragraph_open
                  inline
                paragraph_close
              list_item_close
            bullet_list_close
          list_item_close
          list_item_open
            paragraph_open
              inline
            paragraph_close
          list_item_close
        ordered_list_close
        "#);
    }

    #[test]
    fn ordered_start_and_interruption() {
        let tokens = blocks("3. c\n4. d\n");
        assert_eq!(tokens[0].attr("start"), Some("3"));

        // only `1.` interrupts a paragraph
        assert_eq!(
            kinds("para\n2. no\n"),
            vec!["paragraph_open", "inline", "paragraph_close"]
        );
        assert_eq!(kinds("para\n1. yes\n")[3], "ordered_list_open");
    }

    #[test]
    fn different_bullet_starts_new_list() {
        let count = kinds("- a\n+ b\n")
            .iter()
            .filter(|k| **k == "bullet_list_open")
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn thematic_break_wins_over_list() {
        assert_eq!(kinds("* * *\n"), vec!["hr"]);
        assert_eq!(kinds("- a\n---\n")[..2], ["bullet_list_open", "list_item_open"]);
        assert_eq!(kinds("- a\n---\n").last(), Some(&"hr"));
    }

    #[test]
    fn definitions_are_collected_and_removed() {
        let mut env = Env::default();
        let tokens = parse("[a]: /one\n[a]: /two\n[b]: /b 'B'\ntext\n", &mut env);
        assert_eq!(env.references["A"].href, "/one");
        assert_eq!(env.references["B"].title, "B");
        assert_eq!(tokens[1].content, "text");
    }

    #[test]
    fn blank_line_after_nested_list_makes_item_loose() {
        let tokens = blocks("- a\n  - b\n\n  c\n");
        let first_para = tokens
            .iter()
            .find(|t| t.kind == TokenKind::ParagraphOpen)
            .unwrap();
        assert!(!first_para.hidden);
    }
}
