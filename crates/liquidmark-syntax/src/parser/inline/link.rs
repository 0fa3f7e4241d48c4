use log::trace;

use crate::helpers::{
    normalize_link, normalize_reference, parse_conventional_destination, parse_link_destination,
    parse_link_label, parse_link_title, skip_whitespace, validate_link,
};
use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;
use crate::token::{Nesting, TokenKind};

/// `[text](destination "title")` and reference links.
///
/// With tag destinations enabled, a template tag in destination position is
/// used as the `href` verbatim, skipping normalization and validation.
pub struct Link {
    tag_destinations: bool,
}

impl Link {
    /// Plain CommonMark destinations only.
    pub fn conventional() -> Self {
        Self {
            tag_destinations: false,
        }
    }

    /// Template tags accepted as destinations.
    pub fn with_tag_destinations() -> Self {
        Self {
            tag_destinations: true,
        }
    }
}

impl InlineRule for Link {
    fn name(&self) -> &'static str {
        "link"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        let src = state.src;
        let bytes = src.as_bytes();
        let old_pos = state.pos;
        let max = state.pos_max;

        if bytes.get(state.pos) != Some(&b'[') {
            return false;
        }

        let label_start = state.pos + 1;
        let Some(label_end) = parse_link_label(state, state.pos, true) else {
            return false;
        };

        let mut pos = label_end + 1;
        let mut href = String::new();
        let mut title = String::new();
        let mut parse_reference = true;

        if pos < max && bytes[pos] == b'(' {
            // inline link; a shortcut reference is no longer possible
            parse_reference = false;

            pos = skip_whitespace(bytes, pos + 1, max);
            if pos >= max {
                return false;
            }

            let destination = if self.tag_destinations {
                parse_link_destination(src, pos, max)
            } else {
                parse_conventional_destination(src, pos, max)
            };

            if let Some(destination) = destination {
                if destination.is_tag {
                    trace!("link to tag {:?}", destination.text);
                    href = destination.text;
                    pos = destination.end;
                } else {
                    let normalized = normalize_link(&destination.text);
                    if validate_link(&normalized) {
                        href = normalized;
                        pos = destination.end;
                    } else {
                        trace!("rejected link destination {:?}", destination.text);
                    }
                }

                let before_title = pos;
                pos = skip_whitespace(bytes, pos, max);
                if pos < max
                    && before_title != pos
                    && let Some(parsed) = parse_link_title(src, pos, max)
                {
                    title = parsed.text;
                    pos = skip_whitespace(bytes, parsed.end, max);
                }
            }

            if pos >= max || bytes[pos] != b')' {
                parse_reference = true;
            }
            pos += 1;
        }

        if parse_reference {
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

            // collapsed `[]` and shortcut references use the link text
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
            state.pos = label_start;
            state.pos_max = label_end;

            let open = state.push(TokenKind::LinkOpen, "a", Nesting::Open);
            open.attrs.push(("href".to_string(), href));
            if !title.is_empty() {
                open.attrs.push(("title".to_string(), title));
            }

            state.link_level += 1;
            let parser = state.parser;
            parser.tokenize(state);
            state.link_level -= 1;

            state.push(TokenKind::LinkClose, "a", Nesting::Close);
        }

        state.pos = pos;
        state.pos_max = max;
        true
    }
}
