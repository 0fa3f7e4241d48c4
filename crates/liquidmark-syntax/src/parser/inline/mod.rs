//! Inline pass: rule dispatch, token skipping and post-processing.
//!
//! Rules are tried in order at each position. Text no rule claims is
//! collected one character at a time into `pending` and flushed as a text
//! token. After tokenizing, emphasis delimiters are balanced per scope and
//! adjacent text tokens are joined.
//!
//! Default chain:
//!
//! ```text
//! text, newline, escape, backticks, emphasis, liquid, link, image, autolink, entity
//! ```

mod autolink;
mod backticks;
mod emphasis;
mod entity;
mod escape;
mod image;
mod link;
mod liquid;
mod newline;
mod postprocess;
mod text;

use std::mem;

use log::warn;

pub use autolink::Autolink;
pub use backticks::Backticks;
pub use emphasis::Emphasis;
pub use entity::Entity;
pub use escape::Escape;
pub use image::Image;
pub use link::Link;
pub use liquid::Liquid;
pub use newline::Newline;
pub use text::Text;

use super::ruler::Ruler;
use super::state::InlineState;
use super::{Env, ParserOptions};
use crate::helpers::char_len_at;
use crate::token::Token;

/// Tokenizer for inline content.
pub struct InlineParser {
    ruler: Ruler,
    max_nesting: usize,
}

impl InlineParser {
    pub fn new(options: &ParserOptions) -> Self {
        let mut ruler = Ruler::default();
        ruler.push(Text);
        ruler.push(Newline);
        ruler.push(Escape);
        ruler.push(Backticks);
        ruler.push(Emphasis);
        ruler.push(Link::conventional());
        ruler.push(Image);
        ruler.push(Autolink);
        ruler.push(Entity);

        if options.liquid_tags {
            ruler.insert_after("emphasis", Liquid);
            ruler.replace("link", Link::with_tag_destinations());
        }

        Self {
            ruler,
            max_nesting: options.max_nesting,
        }
    }

    pub fn ruler(&self) -> &Ruler {
        &self.ruler
    }

    pub fn ruler_mut(&mut self) -> &mut Ruler {
        &mut self.ruler
    }

    /// Tokenize and post-process one inline buffer.
    pub fn parse(&self, src: &str, env: &Env) -> Vec<Token> {
        let mut state = InlineState::new(src, env, self);
        self.tokenize(&mut state);

        let mut scopes = mem::take(&mut state.closed_scopes);
        scopes.push(mem::take(&mut state.delimiters));
        for scope in &mut scopes {
            postprocess::balance_pairs(scope);
        }
        for scope in &scopes {
            emphasis::post_process(&mut state.tokens, scope);
        }

        let mut tokens = state.tokens;
        postprocess::fragments_join(&mut tokens);
        tokens
    }

    /// Run the rule chain over `state.pos..state.pos_max`, pushing tokens.
    pub fn tokenize(&self, state: &mut InlineState<'_>) {
        let end = state.pos_max;

        while state.pos < end {
            let prev_pos = state.pos;
            let mut matched = false;

            if state.level < self.max_nesting {
                for rule in self.ruler.iter() {
                    if rule.parse(state, false) {
                        if state.pos > prev_pos {
                            matched = true;
                            break;
                        }
                        warn!("inline rule `{}` matched without advancing", rule.name());
                        state.pos = prev_pos;
                    }
                }
            }

            if matched {
                continue;
            }

            let len = char_len_at(state.src, state.pos);
            let next = (state.pos + len).min(state.src.len());
            state.pending.push_str(&state.src[state.pos..next]);
            state.pos = next;
        }

        if !state.pending.is_empty() {
            state.push_pending();
        }
    }

    /// Advance `state.pos` past one token without emitting anything.
    ///
    /// Rules run in silent mode; results are cached per start position.
    /// When nothing matches, one character is skipped. Beyond the nesting
    /// limit the rest of the range is skipped.
    pub fn skip_token(&self, state: &mut InlineState<'_>) {
        let pos = state.pos;
        if let Some(&end) = state.cache.get(&pos) {
            state.pos = end;
            return;
        }

        let mut matched = false;
        if state.level < self.max_nesting {
            for rule in self.ruler.iter() {
                state.level += 1;
                let ok = rule.parse(state, true);
                state.level -= 1;
                if ok && state.pos > pos {
                    matched = true;
                    break;
                }
                state.pos = pos;
            }
        } else {
            state.pos = state.pos_max;
            matched = true;
        }

        if !matched {
            state.pos = (pos + char_len_at(state.src, pos)).min(state.src.len());
        }
        state.cache.insert(pos, state.pos);
    }
}

impl Default for InlineParser {
    fn default() -> Self {
        Self::new(&ParserOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{TokenKind, dump_tokens};
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Vec<Token> {
        InlineParser::default().parse(src, &Env::default())
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|token| token.kind).collect()
    }

    #[test]
    fn default_chain_order() {
        let parser = InlineParser::default();
        assert_eq!(
            parser.ruler().names(),
            vec![
                "text",
                "newline",
                "escape",
                "backticks",
                "emphasis",
                "liquid",
                "link",
                "image",
                "autolink",
                "entity"
            ]
        );
    }

    #[test]
    fn liquid_rule_absent_when_disabled() {
        let parser = InlineParser::new(&ParserOptions {
            liquid_tags: false,
            ..ParserOptions::default()
        });
        assert!(!parser.ruler().names().contains(&"liquid"));

        let tokens = parser.parse("{{ x }}", &Env::default());
        assert_eq!(kinds(&tokens), vec![TokenKind::Text]);
        assert_eq!(tokens[0].content, "{{ x }}");
    }

    #[test]
    fn plain_text_becomes_one_token() {
        let tokens = parse("hello {world} % done");
        assert_eq!(kinds(&tokens), vec![TokenKind::Text]);
        assert_eq!(tokens[0].content, "hello {world} % done");
    }

    #[test]
    fn emphasis_and_tag_in_one_line() {
        insta::assert_snapshot!(dump_tokens(&parse("Hi *{{ name }}*, see **[{{ link }}]({{ url }})**")), @r#"
        text "Hi "
        em_open
          liquid_open
            text "{{ name }}"
          liquid_close
        em_close
        text ", see "
        strong_open
          link_open href="{{ url }}"
            liquid_open
              text "{{ link }}"
            liquid_close
          link_close
        strong_close
        "#);
    }

    #[test]
    fn skip_token_caches_positions() {
        let parser = InlineParser::default();
        let env = Env::default();
        let mut state = InlineState::new("`code` rest", &env, &parser);

        parser.skip_token(&mut state);
        assert_eq!(state.pos, 6);
        assert_eq!(state.cache.get(&0), Some(&6));

        state.pos = 0;
        parser.skip_token(&mut state);
        assert_eq!(state.pos, 6);
    }

    #[test]
    fn nesting_limit_degrades_to_text() {
        let parser = InlineParser::new(&ParserOptions {
            max_nesting: 0,
            ..ParserOptions::default()
        });
        let tokens = parser.parse("*a* {{ b }}", &Env::default());
        assert_eq!(kinds(&tokens), vec![TokenKind::Text]);
        assert_eq!(tokens[0].content, "*a* {{ b }}");
    }
}
