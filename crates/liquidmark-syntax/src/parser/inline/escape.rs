use crate::helpers::{is_escapable, is_space};
use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;
use crate::token::{Nesting, TokenKind};

/// Backslash escapes and backslash hard breaks.
pub struct Escape;

impl InlineRule for Escape {
    fn name(&self) -> &'static str {
        "escape"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        let pos = state.pos;
        if state.byte_at(pos) != Some(b'\\') {
            return false;
        }

        // a trailing backslash is plain text
        let Some(next) = state.byte_at(pos + 1).filter(|_| pos + 1 < state.pos_max) else {
            return false;
        };

        if next == b'\n' {
            if !silent {
                state.push(TokenKind::Hardbreak, "br", Nesting::SelfClosing);
            }
            state.pos += 2;
            while state.pos < state.pos_max && state.byte_at(state.pos).is_some_and(is_space) {
                state.pos += 1;
            }
            return true;
        }

        if is_escapable(next) {
            if !silent {
                state.pending.push(next as char);
            }
            state.pos += 2;
            return true;
        }

        if !silent {
            state.pending.push('\\');
        }
        state.pos += 1;
        true
    }
}
