use std::borrow::Cow;
use std::mem;

use liquidmark_syntax::TemplateTag;

use super::SerializerOptions;
use super::escape::escape;
use crate::models::{Mark, Node, NodeKind};

/// How a mark is written around its text.
struct MarkInfo {
    /// May be closed and reopened in a different order than it was opened
    mixable: bool,
    /// Whitespace at the mark's edges is moved outside of it
    expel_whitespace: bool,
    /// Marked text is Markdown-escaped
    escape: bool,
}

fn mark_info(mark: &Mark) -> MarkInfo {
    match mark {
        Mark::Em | Mark::Strong => MarkInfo {
            mixable: true,
            expel_whitespace: true,
            escape: true,
        },
        Mark::Link { .. } => MarkInfo {
            mixable: false,
            expel_whitespace: false,
            escape: true,
        },
        Mark::Code | Mark::Liquid => MarkInfo {
            mixable: false,
            expel_whitespace: false,
            escape: false,
        },
    }
}

/// Output buffer and block context while serializing a document.
pub(super) struct SerializerState<'o> {
    options: &'o SerializerOptions,
    pub out: String,
    /// Prefix written at the start of every line (`> `, list indentation)
    delim: String,
    /// Kind of the block that was just closed, if its separator is pending
    closed: Option<&'static str>,
    in_autolink: bool,
    at_block_start: bool,
    in_tight_list: bool,
}

impl<'o> SerializerState<'o> {
    pub fn new(options: &'o SerializerOptions) -> Self {
        Self {
            options,
            out: String::new(),
            delim: String::new(),
            closed: None,
            in_autolink: false,
            at_block_start: false,
            in_tight_list: false,
        }
    }

    fn flush_close(&mut self, size: usize) {
        if self.closed.is_none() {
            return;
        }
        if !self.at_blank() {
            self.out.push('\n');
        }
        if size > 1 {
            let delim_min = self.delim.trim_end().to_string();
            for _ in 1..size {
                self.out.push_str(&delim_min);
                self.out.push('\n');
            }
        }
        self.closed = None;
    }

    fn wrap_block(
        &mut self,
        delim: &str,
        first_delim: Option<&str>,
        node: &Node,
        f: impl FnOnce(&mut Self),
    ) {
        let old = self.delim.clone();
        self.write(first_delim.unwrap_or(delim));
        self.delim.push_str(delim);
        f(self);
        self.delim = old;
        self.close_block(node);
    }

    fn at_blank(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn ensure_new_line(&mut self) {
        if !self.at_blank() {
            self.out.push('\n');
        }
    }

    fn write(&mut self, content: &str) {
        self.flush_close(2);
        if !self.delim.is_empty() && self.at_blank() {
            self.out.push_str(&self.delim);
        }
        self.out.push_str(content);
    }

    fn close_block(&mut self, node: &Node) {
        self.closed = Some(node.kind.name());
    }

    fn text(&mut self, text: &str, escape_text: bool) {
        let lines: Vec<&str> = text.split('\n').collect();
        for (i, line) in lines.iter().enumerate() {
            self.write("");
            // `!` right before a link would make it an image
            if !escape_text && line.starts_with('[') && ends_with_unescaped(&self.out, '!') {
                escape_last(&mut self.out);
            }
            // `{` right before `{` or `%` would open a template tag
            if line.starts_with(['{', '%']) && ends_with_unescaped(&self.out, '{') {
                escape_last(&mut self.out);
            }
            if escape_text {
                let escaped = escape(line, self.at_block_start);
                self.out.push_str(&escaped);
            } else {
                self.out.push_str(line);
            }
            if i + 1 != lines.len() {
                self.out.push('\n');
            }
        }
    }

    pub fn render_content(&mut self, parent: &Node) {
        for (index, child) in parent.content.iter().enumerate() {
            self.render(child, &parent.content, index);
        }
    }

    fn render(&mut self, node: &Node, parent: &[Node], index: usize) {
        match &node.kind {
            NodeKind::Doc | NodeKind::ListItem => self.render_content(node),
            NodeKind::Blockquote => {
                self.wrap_block("> ", None, node, |state| state.render_content(node));
            }
            NodeKind::CodeBlock { params } => {
                let text = node.text_content();
                let fence = code_fence(&text);
                self.write(&format!("{fence}{params}\n"));
                self.text(&text, false);
                self.ensure_new_line();
                self.write(&fence);
                self.close_block(node);
            }
            NodeKind::Heading { level } => {
                self.write(&format!("{} ", "#".repeat(*level as usize)));
                self.render_inline(node, false);
                self.close_block(node);
            }
            NodeKind::HorizontalRule => {
                self.write("---");
                self.close_block(node);
            }
            NodeKind::BulletList { tight } => {
                let bullet = format!("{} ", self.options.bullet);
                self.render_list(node, *tight, "  ", |_| bullet.clone());
            }
            NodeKind::OrderedList { order, tight } => {
                let start = *order as usize;
                let max_width = (start + node.content.len().saturating_sub(1))
                    .to_string()
                    .len();
                let space = " ".repeat(max_width + 2);
                self.render_list(node, *tight, &space, |i| {
                    format!("{:>max_width$}. ", start + i)
                });
            }
            NodeKind::Paragraph => {
                self.render_inline(node, true);
                self.close_block(node);
            }
            NodeKind::Image { src, alt, title } => {
                let mut out = format!(
                    "![{}]({}",
                    escape(alt.as_deref().unwrap_or_default(), false),
                    escape_chars(src, &['(', ')'])
                );
                if let Some(title) = title {
                    out.push_str(&format!(" \"{}\"", escape_chars(title, &['"'])));
                }
                out.push(')');
                self.write(&out);
            }
            NodeKind::HardBreak => {
                // trailing breaks would be lost on reparse
                let more_content = parent[index + 1..]
                    .iter()
                    .any(|next| next.kind != NodeKind::HardBreak);
                if more_content {
                    self.write("\\\n");
                }
            }
            NodeKind::Text(text) => {
                let escape_text = !self.in_autolink;
                self.text(text, escape_text);
            }
        }
    }

    fn render_list(
        &mut self,
        node: &Node,
        tight: bool,
        delim: &str,
        first_delim: impl Fn(usize) -> String,
    ) {
        if self.closed == Some(node.kind.name()) {
            // keep two adjacent lists of the same kind apart
            self.flush_close(3);
        } else if self.in_tight_list {
            self.flush_close(1);
        }

        let is_tight = tight || self.options.tight_lists;
        let prev_tight = mem::replace(&mut self.in_tight_list, is_tight);
        for (i, child) in node.content.iter().enumerate() {
            if i > 0 && is_tight {
                self.flush_close(1);
            }
            let first = first_delim(i);
            self.wrap_block(delim, Some(&first), node, |state| {
                state.render(child, &node.content, i);
            });
        }
        self.in_tight_list = prev_tight;
    }

    fn render_inline(&mut self, parent: &Node, from_block_start: bool) {
        self.at_block_start = from_block_start;
        let content = &parent.content;
        let mut active: Vec<Mark> = Vec::new();
        let mut trailing = String::new();

        for index in 0..=content.len() {
            self.progress(content.get(index), content, index, &mut active, &mut trailing);
        }
        self.at_block_start = false;
    }

    /// Render one inline node, closing and opening marks around it. Called
    /// once more with `None` after the last node to close remaining marks.
    fn progress(
        &mut self,
        node: Option<&Node>,
        parent: &[Node],
        index: usize,
        active: &mut Vec<Mark>,
        trailing: &mut String,
    ) {
        let mut node: Option<Cow<'_, Node>> = node.map(Cow::Borrowed);
        let mut marks: Vec<Mark> = node.as_ref().map(|n| n.marks.clone()).unwrap_or_default();

        if node
            .as_ref()
            .is_some_and(|n| n.kind == NodeKind::HardBreak)
        {
            // a break closing a mark would end up outside of it on reparse
            marks.retain(|mark| {
                parent.get(index + 1).is_some_and(|next| {
                    mark.is_in_set(&next.marks)
                        && next.as_text().is_none_or(|text| text.chars().any(|c| !c.is_whitespace()))
                })
            });
        }

        let mut leading = mem::take(trailing);

        let expel_leading = marks
            .iter()
            .any(|mark| mark_info(mark).expel_whitespace && !mark.is_in_set(active));
        if expel_leading && let Some(text) = node.as_ref().and_then(|n| n.as_text()) {
            let rest = text.trim_start();
            let lead = &text[..text.len() - rest.len()];
            if !lead.is_empty() {
                leading.push_str(lead);
                let rest = rest.to_string();
                node = node_with_text(&node, rest);
                if node.is_none() {
                    marks = active.clone();
                }
            }
        }

        let expel_trailing = marks.iter().any(|mark| {
            mark_info(mark).expel_whitespace
                && parent
                    .get(index + 1)
                    .is_none_or(|next| !mark.is_in_set(&next.marks))
        });
        if expel_trailing && let Some(text) = node.as_ref().and_then(|n| n.as_text()) {
            let rest = text.trim_end();
            let trail = &text[rest.len()..];
            if !trail.is_empty() {
                *trailing = trail.to_string();
                let rest = rest.to_string();
                node = node_with_text(&node, rest);
                if node.is_none() {
                    marks = active.clone();
                }
            }
        }

        let inner = marks.last().cloned();
        let no_escape = inner.as_ref().is_some_and(|mark| !mark_info(mark).escape);
        let len = marks.len() - usize::from(no_escape);

        // reorder mixable marks to match the order they are already open in
        let mut i = 0;
        'outer: while i < len {
            if !mark_info(&marks[i]).mixable {
                break;
            }
            for j in 0..active.len() {
                if !mark_info(&active[j]).mixable {
                    break;
                }
                if marks[i] == active[j] {
                    let mark = marks[i].clone();
                    if i > j {
                        let mut reordered = marks[..j].to_vec();
                        reordered.push(mark);
                        reordered.extend_from_slice(&marks[j..i]);
                        reordered.extend_from_slice(&marks[i + 1..len]);
                        marks = reordered;
                    } else if j > i {
                        let mut reordered = marks[..i].to_vec();
                        reordered.extend_from_slice(&marks[i + 1..j]);
                        reordered.push(mark);
                        reordered.extend_from_slice(&marks[j..len]);
                        marks = reordered;
                    }
                    i += 1;
                    continue 'outer;
                }
            }
            i += 1;
        }

        let mut keep = 0;
        while keep < active.len().min(len) && marks[keep] == active[keep] {
            keep += 1;
        }

        while keep < active.len() {
            if let Some(mark) = active.pop() {
                let close = self.mark_string(&mark, false, parent, index);
                self.text(&close, false);
            }
        }

        if !leading.is_empty() {
            self.text(&leading, true);
        }

        let Some(node) = node else {
            return;
        };

        while active.len() < len {
            let add = marks[active.len()].clone();
            let open = self.mark_string(&add, true, parent, index);
            active.push(add);
            self.text(&open, false);
            self.at_block_start = false;
        }

        match (&inner, node.as_text()) {
            (Some(inner), Some(text)) if no_escape => {
                let open = self.mark_string(inner, true, parent, index);
                let close = self.mark_string(inner, false, parent, index + 1);
                self.text(&format!("{open}{text}{close}"), false);
            }
            _ => self.render(&node, parent, index),
        }
        self.at_block_start = false;
    }

    fn mark_string(&mut self, mark: &Mark, open: bool, parent: &[Node], index: usize) -> String {
        match mark {
            Mark::Em => "*".to_string(),
            Mark::Strong => "**".to_string(),
            Mark::Link { href, title } => {
                if open {
                    self.in_autolink = is_plain_url(mark, parent, index);
                    return (if self.in_autolink { "<" } else { "[" }).to_string();
                }
                if mem::take(&mut self.in_autolink) {
                    return ">".to_string();
                }
                let mut out = String::from("](");
                if TemplateTag::from_raw(href).is_some() {
                    out.push_str(href);
                } else {
                    out.push_str(&escape_chars(href, &['(', ')', '"']));
                }
                if let Some(title) = title {
                    out.push_str(&format!(" \"{}\"", escape_chars(title, &['"'])));
                }
                out.push(')');
                out
            }
            Mark::Code => {
                let node = if open {
                    parent.get(index)
                } else {
                    index.checked_sub(1).and_then(|i| parent.get(i))
                };
                backticks_for(node, open)
            }
            Mark::Liquid => String::new(),
        }
    }
}

fn node_with_text<'n>(node: &Option<Cow<'n, Node>>, text: String) -> Option<Cow<'n, Node>> {
    if text.is_empty() {
        return None;
    }
    node.as_ref().map(|n| Cow::Owned(n.with_text(text)))
}

fn ends_with_unescaped(out: &str, ch: char) -> bool {
    let Some(rest) = out.strip_suffix(ch) else {
        return false;
    };
    let backslashes = rest.len() - rest.trim_end_matches('\\').len();
    backslashes % 2 == 0
}

/// Escape the character at the end of `out`.
fn escape_last(out: &mut String) {
    if let Some(ch) = out.pop() {
        out.push('\\');
        out.push(ch);
    }
}

fn escape_chars(text: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if chars.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Fence for a code block: one backtick longer than the longest run of
/// three or more in the content.
fn code_fence(text: &str) -> String {
    let longest = longest_backtick_run(text);
    if longest >= 3 {
        "`".repeat(longest + 1)
    } else {
        "```".to_string()
    }
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Backticks around inline code, padded with a space when the code itself
/// contains backticks.
fn backticks_for(node: Option<&Node>, open: bool) -> String {
    let len = node.and_then(Node::as_text).map_or(0, longest_backtick_run);
    let mut out = if len > 0 && !open {
        String::from(" `")
    } else {
        String::from("`")
    };
    out.push_str(&"`".repeat(len));
    if len > 0 && open {
        out.push(' ');
    }
    out
}

/// A link whose text is its own absolute URL is written as `<url>`.
fn is_plain_url(link: &Mark, parent: &[Node], index: usize) -> bool {
    let Mark::Link { href, title } = link else {
        return false;
    };
    let has_scheme = href.split_once(':').is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if title.is_some() || !has_scheme {
        return false;
    }
    let Some(content) = parent.get(index) else {
        return false;
    };
    if content.as_text() != Some(href.as_str()) || content.marks.last() != Some(link) {
        return false;
    }
    parent
        .get(index + 1)
        .is_none_or(|next| !link.is_in_set(&next.marks))
}
