use std::collections::HashMap;

use crate::parser::state::Delimiter;
use crate::token::{Nesting, Token, TokenKind};

/// Pair emphasis openers with closers within one scope.
///
/// Follows the CommonMark "rule of 3". `openers_bottom` and `jumps` keep
/// the search linear on pathological input such as `*_*_*_...`.
pub(super) fn balance_pairs(delimiters: &mut [Delimiter]) {
    let max = delimiters.len();
    if max == 0 {
        return;
    }

    let mut openers_bottom: HashMap<u8, [isize; 6]> = HashMap::new();
    let mut header_idx = 0usize;
    let mut last_token_idx: isize = -2;
    let mut jumps: Vec<isize> = Vec::with_capacity(max);

    for closer_idx in 0..max {
        jumps.push(0);
        let closer = delimiters[closer_idx];

        // markers of one run have adjacent tokens
        if delimiters[header_idx].marker != closer.marker
            || last_token_idx != closer.token as isize - 1
        {
            header_idx = closer_idx;
        }
        last_token_idx = closer.token as isize;

        if !closer.close {
            continue;
        }

        let bucket = (if closer.open { 3 } else { 0 }) + closer.length % 3;
        let min_opener_idx = openers_bottom.entry(closer.marker).or_insert([-1; 6])[bucket];

        let mut opener_idx = header_idx as isize - jumps[header_idx] - 1;
        let mut new_min_opener_idx = opener_idx;

        while opener_idx > min_opener_idx {
            let opener = delimiters[opener_idx as usize];

            if opener.marker == closer.marker && opener.open && opener.end.is_none() {
                let is_odd_match = (opener.close || closer.open)
                    && (opener.length + closer.length) % 3 == 0
                    && (opener.length % 3 != 0 || closer.length % 3 != 0);

                if !is_odd_match {
                    let last_jump =
                        if opener_idx > 0 && !delimiters[opener_idx as usize - 1].open {
                            jumps[opener_idx as usize - 1] + 1
                        } else {
                            0
                        };

                    jumps[closer_idx] = closer_idx as isize - opener_idx + last_jump;
                    jumps[opener_idx as usize] = last_jump;

                    delimiters[closer_idx].open = false;
                    delimiters[opener_idx as usize].end = Some(closer_idx);
                    delimiters[opener_idx as usize].close = false;
                    new_min_opener_idx = -1;
                    last_token_idx = -2;
                    break;
                }
            }

            opener_idx -= jumps[opener_idx as usize] + 1;
        }

        if new_min_opener_idx != -1 {
            openers_bottom.entry(closer.marker).or_insert([-1; 6])[bucket] = new_min_opener_idx;
        }
    }
}

/// Join adjacent text tokens, drop empty ones and recompute levels.
pub(super) fn fragments_join(tokens: &mut Vec<Token>) {
    let mut level = 0usize;
    let mut joined: Vec<Token> = Vec::with_capacity(tokens.len());

    for mut token in tokens.drain(..) {
        if token.nesting == Nesting::Close {
            level = level.saturating_sub(1);
        }
        token.level = level;
        if token.nesting == Nesting::Open {
            level += 1;
        }

        if token.kind == TokenKind::Text {
            if token.content.is_empty() {
                continue;
            }
            if let Some(last) = joined.last_mut()
                && last.kind == TokenKind::Text
                && last.span.is_none()
                && token.span.is_none()
            {
                last.content.push_str(&token.content);
                continue;
            }
        }
        joined.push(token);
    }

    *tokens = joined;
}
