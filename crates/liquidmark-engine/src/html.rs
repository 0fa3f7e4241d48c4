//! Document tree to HTML.
//!
//! Spanning marks shared by adjacent inline nodes are opened once. The
//! template tag mark does not span, so every tag gets its own `<liquid>`
//! element even when two tags are adjacent.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::{Mark, Node, NodeKind};

/// Render `doc` as HTML, one block element per line.
pub fn to_html(doc: &Node) -> String {
    let mut out = String::new();
    render_block(doc, &mut out);
    out
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(value));
    out.push('"');
}

fn render_children(node: &Node, out: &mut String) {
    for child in &node.content {
        render_block(child, out);
    }
}

fn render_block(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Doc => render_children(node, out),
        NodeKind::Paragraph => {
            out.push_str("<p>");
            render_inline(&node.content, out);
            out.push_str("</p>\n");
        }
        NodeKind::Blockquote => {
            out.push_str("<blockquote>\n");
            render_children(node, out);
            out.push_str("</blockquote>\n");
        }
        NodeKind::HorizontalRule => out.push_str("<hr>\n"),
        NodeKind::Heading { level } => {
            out.push_str(&format!("<h{level}>"));
            render_inline(&node.content, out);
            out.push_str(&format!("</h{level}>\n"));
        }
        NodeKind::CodeBlock { params } => {
            out.push_str("<pre");
            if !params.is_empty() {
                push_attr(out, "data-params", params);
            }
            out.push_str("><code>");
            out.push_str(&encode_text(&node.text_content()));
            out.push_str("</code></pre>\n");
        }
        NodeKind::OrderedList { order, tight } => {
            out.push_str("<ol");
            if *order != 1 {
                push_attr(out, "start", &order.to_string());
            }
            if *tight {
                push_attr(out, "data-tight", "true");
            }
            out.push_str(">\n");
            render_children(node, out);
            out.push_str("</ol>\n");
        }
        NodeKind::BulletList { tight } => {
            out.push_str("<ul");
            if *tight {
                push_attr(out, "data-tight", "true");
            }
            out.push_str(">\n");
            render_children(node, out);
            out.push_str("</ul>\n");
        }
        NodeKind::ListItem => {
            out.push_str("<li>");
            render_children(node, out);
            out.push_str("</li>\n");
        }
        NodeKind::Text(_) | NodeKind::Image { .. } | NodeKind::HardBreak => {
            render_inline(std::slice::from_ref(node), out);
        }
    }
}

fn open_mark(mark: &Mark, out: &mut String) {
    out.push('<');
    out.push_str(mark.spec().element);
    if let Mark::Link { href, title } = mark {
        push_attr(out, "href", href);
        if let Some(title) = title {
            push_attr(out, "title", title);
        }
    }
    out.push('>');
}

fn close_mark(mark: &Mark, out: &mut String) {
    out.push_str("</");
    out.push_str(mark.spec().element);
    out.push('>');
}

fn render_inline(content: &[Node], out: &mut String) {
    let mut active: Vec<&Mark> = Vec::new();

    for node in content {
        let mut keep = 0;
        while keep < active.len() && keep < node.marks.len() {
            let next = &node.marks[keep];
            if next != active[keep] || !next.spec().spanning {
                break;
            }
            keep += 1;
        }
        while active.len() > keep {
            if let Some(mark) = active.pop() {
                close_mark(mark, out);
            }
        }
        for mark in &node.marks[keep..] {
            open_mark(mark, out);
            active.push(mark);
        }
        render_leaf(node, out);
    }

    while let Some(mark) = active.pop() {
        close_mark(mark, out);
    }
}

fn render_leaf(node: &Node, out: &mut String) {
    match &node.kind {
        NodeKind::Text(text) => out.push_str(&encode_text(text)),
        NodeKind::HardBreak => out.push_str("<br>"),
        NodeKind::Image { src, alt, title } => {
            out.push_str("<img");
            push_attr(out, "src", src);
            if let Some(alt) = alt {
                push_attr(out, "alt", alt);
            }
            if let Some(title) = title {
                push_attr(out, "title", title);
            }
            out.push('>');
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::DocumentParser;
    use pretty_assertions::assert_eq;

    fn html(src: &str) -> String {
        to_html(&DocumentParser::default().parse(src).unwrap())
    }

    #[test]
    fn adjacent_tags_get_separate_elements() {
        let doc = Node::doc(vec![Node::paragraph(vec![
            Node::text("{{ a }}", vec![Mark::Em, Mark::Liquid]),
            Node::text("{{ b }}", vec![Mark::Em, Mark::Liquid]),
        ])]);
        assert_eq!(
            to_html(&doc),
            "<p><em><liquid>{{ a }}</liquid><liquid>{{ b }}</liquid></em></p>\n"
        );
    }

    #[test]
    fn link_with_tag_href() {
        assert_eq!(
            html("[Docs]({{ \"a\" | url }} \"T\")"),
            "<p><a href=\"{{ &quot;a&quot; | url }}\" title=\"T\">Docs</a></p>\n"
        );
    }

    #[test]
    fn blocks() {
        insta::assert_snapshot!(html("# {{ t }}\n\n3. a & b\n4. <c>\n\n```js\nx < y\n```\n\n---\n\n> q  \n> r\n"), @r#"
        <h1><liquid>{{ t }}</liquid></h1>
        <ol start="3" data-tight="true">
        <li><p>a &amp; b</p>
        </li>
        <li><p>&lt;c&gt;</p>
        </li>
        </ol>
        <pre data-params="js"><code>x &lt; y</code></pre>
        <hr>
        <blockquote>
        <p>q<br>r</p>
        </blockquote>
        "#);
    }

    #[test]
    fn images() {
        assert_eq!(
            html("![alt](/a.png)"),
            "<p><img src=\"/a.png\" alt=\"alt\"></p>\n"
        );
    }
}
