use std::sync::OnceLock;

use regex::Regex;

use crate::helpers::decode_entity;
use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z][a-zA-Z0-9]{1,31});")
            .expect("Invalid entity regex")
    })
}

/// HTML entities, decoded into text.
pub struct Entity;

impl InlineRule for Entity {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        let src = state.src;
        let pos = state.pos;
        if src.as_bytes().get(pos) != Some(&b'&') {
            return false;
        }

        let decoded = entity_regex()
            .find(&src[pos..state.pos_max])
            .map(|found| (found.len(), decode_entity(found.as_str())));

        match decoded {
            Some((len, Some(text))) => {
                if !silent {
                    state.pending.push_str(&text);
                }
                state.pos += len;
            }
            // a numeric entity with a forbidden code point becomes U+FFFD
            Some((len, None)) if src[pos..].starts_with("&#") => {
                if !silent {
                    state.pending.push('\u{fffd}');
                }
                state.pos += len;
            }
            _ => {
                if !silent {
                    state.pending.push('&');
                }
                state.pos += 1;
            }
        }
        true
    }
}
