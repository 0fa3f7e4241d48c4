use log::trace;

use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;
use crate::tag::{TagKind, TemplateTag};
use crate::token::{Nesting, TokenKind};

/// Template tags `{{ ... }}` and `{% ... %}` as atomic spans.
///
/// Registered after `emphasis`, so a `*` inside a tag body is never seen
/// by the emphasis rule. Emits `liquid_open`, one text token holding the
/// raw tag, and `liquid_close`.
pub struct Liquid;

impl InlineRule for Liquid {
    fn name(&self) -> &'static str {
        "liquid"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        let start = state.pos;
        let max = state.pos_max;

        let Some(kind) = TagKind::at(state.src.as_bytes(), start) else {
            return false;
        };
        if silent {
            return false;
        }
        if start + 3 >= max {
            return false;
        }

        // a later opener walks the same tokens as an earlier unclosed one
        if state
            .unclosed_tags
            .get(&(kind, max))
            .is_some_and(|&unclosed| unclosed <= start)
        {
            return false;
        }

        let Some(end) = find_closing_tag(state, start, max, kind) else {
            trace!("unterminated {} tag at {start}", kind.name());
            state
                .unclosed_tags
                .entry((kind, max))
                .and_modify(|unclosed| *unclosed = (*unclosed).min(start))
                .or_insert(start);
            state.pos = start;
            return false;
        };

        let src = state.src;
        let tag = TemplateTag {
            kind,
            raw: &src[start..end],
            span: start..end,
        };
        trace!("{} tag {:?} at {:?}", kind.name(), tag.raw, tag.span);

        let open = state.push(TokenKind::LiquidOpen, "liquid", Nesting::Open);
        open.markup = tag.open_delimiter().to_string();

        let content = state.push(TokenKind::Text, "", Nesting::SelfClosing);
        content.content = tag.raw.to_string();
        content.info = kind.name().to_string();
        content.span = Some(tag.span.clone());

        let close = state.push(TokenKind::LiquidClose, "liquid", Nesting::Close);
        close.markup = tag.close_delimiter().to_string();

        state.pos = end;
        true
    }
}

/// Step over tokens until the closer is at the cursor. Returns the offset
/// just past the closer.
fn find_closing_tag(
    state: &mut InlineState<'_>,
    start: usize,
    max: usize,
    kind: TagKind,
) -> Option<usize> {
    let parser = state.parser;
    state.pos = start + 2;

    while state.pos < max {
        if kind.is_closer_at(state.src.as_bytes(), state.pos, max) {
            return Some(state.pos + 2);
        }
        parser.skip_token(state);
    }
    None
}
