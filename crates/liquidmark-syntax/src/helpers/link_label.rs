use crate::parser::state::InlineState;

/// Find the `]` closing the link label that opens with `[` at `start`.
///
/// Scans with the inline `skip_token` primitive so code spans, template
/// tags and escapes inside the label are stepped over as units. Returns the
/// offset of the closing `]`, or `None` if there is none. With
/// `disable_nested`, a nested link inside the label also fails the parse.
///
/// `state.pos` is restored before returning.
pub fn parse_link_label(
    state: &mut InlineState<'_>,
    start: usize,
    disable_nested: bool,
) -> Option<usize> {
    let max = state.pos_max;
    let old_pos = state.pos;
    let parser = state.parser;

    state.pos = start + 1;
    let mut level = 1usize;
    let mut found = false;

    while state.pos < max {
        let marker = state.src.as_bytes()[state.pos];
        if marker == b']' {
            level -= 1;
            if level == 0 {
                found = true;
                break;
            }
        }

        let prev_pos = state.pos;
        parser.skip_token(state);
        if marker == b'[' {
            if prev_pos == state.pos - 1 {
                // plain bracket, nothing consumed it
                level += 1;
            } else if disable_nested {
                state.pos = old_pos;
                return None;
            }
        }
    }

    let label_end = found.then_some(state.pos);
    state.pos = old_pos;
    label_end
}
