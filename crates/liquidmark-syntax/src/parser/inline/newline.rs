use crate::helpers::is_space;
use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;
use crate::token::{Nesting, TokenKind};

/// Line breaks: two trailing spaces make a hard break, anything else is soft.
pub struct Newline;

impl InlineRule for Newline {
    fn name(&self) -> &'static str {
        "newline"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        if state.byte_at(state.pos) != Some(b'\n') {
            return false;
        }

        if !silent {
            let trailing = state.pending.len() - state.pending.trim_end_matches(' ').len();
            if trailing > 0 {
                state.pending.truncate(state.pending.len() - trailing);
                let kind = if trailing >= 2 {
                    TokenKind::Hardbreak
                } else {
                    TokenKind::Softbreak
                };
                state.push(kind, "br", Nesting::SelfClosing);
            } else {
                state.push(TokenKind::Softbreak, "br", Nesting::SelfClosing);
            }
        }

        state.pos += 1;
        while state.pos < state.pos_max && state.byte_at(state.pos).is_some_and(is_space) {
            state.pos += 1;
        }
        true
    }
}
