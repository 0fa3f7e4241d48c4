use crate::parser::ruler::InlineRule;
use crate::parser::state::{Delimiter, InlineState};
use crate::token::{Nesting, Token, TokenKind};

/// `*` and `_` delimiter runs.
///
/// Each delimiter character becomes its own text token plus a delimiter
/// entry; pairing happens after tokenizing.
pub struct Emphasis;

impl InlineRule for Emphasis {
    fn name(&self) -> &'static str {
        "emphasis"
    }

    fn parse(&self, state: &mut InlineState<'_>, silent: bool) -> bool {
        if silent {
            return false;
        }
        let Some(marker) = state.byte_at(state.pos).filter(|&b| b == b'*' || b == b'_') else {
            return false;
        };

        let run = state.scan_delims(state.pos, marker == b'*');
        for _ in 0..run.length {
            let token = state.push(TokenKind::Text, "", Nesting::SelfClosing);
            token.content = (marker as char).to_string();
            let index = state.tokens.len() - 1;
            state.delimiters.push(Delimiter {
                marker,
                length: run.length,
                token: index,
                end: None,
                open: run.can_open,
                close: run.can_close,
            });
        }

        state.pos += run.length;
        true
    }
}

/// Turn paired delimiters into `em`/`strong` tokens.
///
/// Two nested pairs of the same marker whose delimiters are adjacent on
/// both sides merge into one `strong`.
pub(super) fn post_process(tokens: &mut [Token], delimiters: &[Delimiter]) {
    let mut i = delimiters.len();
    while i > 0 {
        i -= 1;
        let start = delimiters[i];
        if start.marker != b'_' && start.marker != b'*' {
            continue;
        }
        let Some(end_index) = start.end else {
            continue;
        };
        let end = delimiters[end_index];

        let is_strong = i > 0
            && delimiters[i - 1].end == Some(end_index + 1)
            && delimiters[i - 1].marker == start.marker
            && delimiters[i - 1].token + 1 == start.token
            && delimiters
                .get(end_index + 1)
                .is_some_and(|next| next.token == end.token + 1);

        let ch = start.marker as char;
        let (open_kind, close_kind, tag, markup) = if is_strong {
            (TokenKind::StrongOpen, TokenKind::StrongClose, "strong", format!("{ch}{ch}"))
        } else {
            (TokenKind::EmOpen, TokenKind::EmClose, "em", ch.to_string())
        };

        let open = &mut tokens[start.token];
        open.kind = open_kind;
        open.tag = tag;
        open.nesting = Nesting::Open;
        open.markup = markup.clone();
        open.content.clear();

        let close = &mut tokens[end.token];
        close.kind = close_kind;
        close.tag = tag;
        close.nesting = Nesting::Close;
        close.markup = markup;
        close.content.clear();

        if is_strong {
            tokens[delimiters[i - 1].token].content.clear();
            tokens[delimiters[end_index + 1].token].content.clear();
            i -= 1;
        }
    }
}
