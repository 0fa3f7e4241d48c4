use crate::parser::ruler::InlineRule;
use crate::parser::state::InlineState;
use crate::lexer::text_run_len;

/// Consumes a run of characters no other rule can start on.
pub struct Text;

impl InlineRule for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        let run = text_run_len(&state.src[state.pos..state.pos_max]);
        if run == 0 {
            return false;
        }

        if !silent {
            state.pending.push_str(&state.src[state.pos..state.pos + run]);
        }
        state.pos += run;
        true
    }
}
