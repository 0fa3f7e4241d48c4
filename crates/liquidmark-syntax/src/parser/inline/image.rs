use crate::helpers::{
    normalize_link, normalize_reference, parse_conventional_destination, parse_link_label,
    parse_link_title, skip_whitespace, validate_link,
};
use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;
use crate::token::{Nesting, TokenKind};

/// `![alt](src "title")` and reference images.
///
/// Image sources always use the conventional destination grammar. The alt
/// text is parsed as its own inline stream into the token's children.
pub struct Image;

impl InlineRule for Image {
    fn name(&self) -> &'static str {
        "image"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        let src = state.src;
        let bytes = src.as_bytes();
        let old_pos = state.pos;
        let max = state.pos_max;

        if bytes.get(state.pos) != Some(&b'!') || bytes.get(state.pos + 1) != Some(&b'[') {
            return false;
        }

        let label_start = state.pos + 2;
        let Some(label_end) = parse_link_label(state, state.pos + 1, false) else {
            return false;
        };

        let mut pos = label_end + 1;
        let href;
        let mut title = String::new();

        if pos < max && bytes[pos] == b'(' {
            pos = skip_whitespace(bytes, pos + 1, max);
            if pos >= max {
                return false;
            }

            let mut target = String::new();
            if let Some(destination) = parse_conventional_destination(src, pos, max) {
                let normalized = normalize_link(&destination.text);
                if validate_link(&normalized) {
                    target = normalized;
                    pos = destination.end;
                }
            }
            href = target;

            let before_title = pos;
            pos = skip_whitespace(bytes, pos, max);
            if pos < max
                && before_title != pos
                && let Some(parsed) = parse_link_title(src, pos, max)
            {
                title = parsed.text;
                pos = skip_whitespace(bytes, parsed.end, max);
            }

            if pos >= max || bytes[pos] != b')' {
                state.pos = old_pos;
                return false;
            }
            pos += 1;
        } else {
            let env = state.env;
            if env.references.is_empty() {
                return false;
            }

            let mut label = None;
            if pos < max && bytes[pos] == b'[' {
                let start = pos + 1;
                match parse_link_label(state, pos, false) {
                    Some(end) => {
                        label = Some(&src[start..end]);
                        pos = end + 1;
                    }
                    None => pos = label_end + 1,
                }
            } else {
                pos = label_end + 1;
            }

            let label = label
                .filter(|label| !label.is_empty())
                .unwrap_or(&src[label_start..label_end]);

            let Some(reference) = env.references.get(&normalize_reference(label)) else {
                state.pos = old_pos;
                return false;
            };
            href = reference.href.clone();
            title = reference.title.clone();
        }

        if !silent {
            let content = &src[label_start..label_end];
            let parser = state.parser;
            let children = parser.parse(content, state.env);

            let token = state.push(TokenKind::Image, "img", Nesting::SelfClosing);
            token.attrs.push(("src".to_string(), href));
            token.attrs.push(("alt".to_string(), String::new()));
            if !title.is_empty() {
                token.attrs.push(("title".to_string(), title));
            }
            token.children = children;
            token.content = content.to_string();
        }

        state.pos = pos;
        state.pos_max = max;
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Env;
    use crate::parser::inline::InlineParser;
    use crate::token::TokenKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn image_with_title_and_tag_alt() {
        let tokens = InlineParser::default().parse(
            r#"![Hi {{ name }}](/logo.png "Logo")"#,
            &Env::default(),
        );
        assert_eq!(tokens.len(), 1);
        let image = &tokens[0];
        assert_eq!(image.kind, TokenKind::Image);
        assert_eq!(image.attr("src"), Some("/logo.png"));
        assert_eq!(image.attr("title"), Some("Logo"));
        assert_eq!(image.content, "Hi {{ name }}");
        assert_eq!(image.children[1].kind, TokenKind::LiquidOpen);
    }

    #[test]
    fn missing_paren_is_text() {
        let tokens = InlineParser::default().parse("![alt](/x", &Env::default());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Text);
    }
}
