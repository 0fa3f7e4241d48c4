//! Mutable state of one inline parse.

use std::collections::HashMap;
use std::mem;

use super::Env;
use crate::tag::TagKind;
use super::inline::InlineParser;
use crate::helpers::{is_punct_char, is_white_space};
use crate::token::{Nesting, Token, TokenKind};

/// An emphasis delimiter run recorded for post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    /// `*` or `_`
    pub marker: u8,
    /// Total length of the run this delimiter belongs to
    pub length: usize,
    /// Index of the text token holding this delimiter character
    pub token: usize,
    /// Index of the matching closer, once paired
    pub end: Option<usize>,
    pub open: bool,
    pub close: bool,
}

/// Result of classifying a delimiter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterRun {
    pub can_open: bool,
    pub can_close: bool,
    pub length: usize,
}

/// Cursor, output and bookkeeping for parsing one inline buffer.
///
/// `pos`/`pos_max` bound the region being tokenized; the link rule narrows
/// `pos_max` to a label while parsing link text.
pub struct InlineState<'s> {
    pub src: &'s str,
    pub env: &'s Env,
    pub(crate) parser: &'s InlineParser,
    pub tokens: Vec<Token>,
    pub pos: usize,
    pub pos_max: usize,
    pub level: usize,
    /// Plain text waiting to become a text token
    pub pending: String,
    pending_level: usize,
    /// `skip_token` results per start position
    pub(crate) cache: HashMap<usize, usize>,
    /// Emphasis delimiters of the innermost open scope
    pub delimiters: Vec<Delimiter>,
    prev_delimiters: Vec<Vec<Delimiter>>,
    /// Delimiter lists of scopes closed so far
    pub(crate) closed_scopes: Vec<Vec<Delimiter>>,
    /// Depth of link text being tokenized
    pub link_level: usize,
    /// Earliest tag opener, per kind and `pos_max`, whose scan found no closer
    pub(crate) unclosed_tags: HashMap<(TagKind, usize), usize>,
    /// Last start of each backtick run length seen while scanning for closers
    pub(crate) backticks: HashMap<usize, usize>,
    /// `pos_max` and opener position of a backtick scan that reached the
    /// end of the range without a closer
    pub(crate) backticks_scanned: Option<(usize, usize)>,
}

impl<'s> InlineState<'s> {
    pub fn new(src: &'s str, env: &'s Env, parser: &'s InlineParser) -> Self {
        Self {
            src,
            env,
            parser,
            tokens: Vec::new(),
            pos: 0,
            pos_max: src.len(),
            level: 0,
            pending: String::new(),
            pending_level: 0,
            cache: HashMap::new(),
            delimiters: Vec::new(),
            prev_delimiters: Vec::new(),
            closed_scopes: Vec::new(),
            link_level: 0,
            unclosed_tags: HashMap::new(),
            backticks: HashMap::new(),
            backticks_scanned: None,
        }
    }

    /// Byte at `pos`, if in range.
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.src.as_bytes().get(pos).copied()
    }

    /// Flush pending text into a text token.
    pub fn push_pending(&mut self) {
        let mut token = Token::new(TokenKind::Text, "", Nesting::SelfClosing);
        token.content = mem::take(&mut self.pending);
        token.level = self.pending_level;
        self.tokens.push(token);
    }

    /// Push a new token, flushing pending text first.
    ///
    /// Opening tokens start a fresh delimiter scope; closing tokens end the
    /// current one.
    pub fn push(&mut self, kind: TokenKind, tag: &'static str, nesting: Nesting) -> &mut Token {
        if !self.pending.is_empty() {
            self.push_pending();
        }

        let mut token = Token::new(kind, tag, nesting);

        if nesting == Nesting::Close {
            self.level = self.level.saturating_sub(1);
            let parent = self.prev_delimiters.pop().unwrap_or_default();
            let scope = mem::replace(&mut self.delimiters, parent);
            self.closed_scopes.push(scope);
        }

        token.level = self.level;

        if nesting == Nesting::Open {
            self.level += 1;
            self.prev_delimiters.push(mem::take(&mut self.delimiters));
        }

        self.pending_level = self.level;
        self.tokens.push(token);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    /// Classify the delimiter run starting at `start` using the flanking
    /// rules. `can_split_word` is true for `*`, false for `_`.
    pub fn scan_delims(&self, start: usize, can_split_word: bool) -> DelimiterRun {
        let bytes = self.src.as_bytes();
        let max = self.pos_max;
        let marker = bytes[start];

        let last_char = self.src[..start].chars().next_back().unwrap_or(' ');

        let mut pos = start;
        while pos < max && bytes[pos] == marker {
            pos += 1;
        }
        let length = pos - start;

        let next_char = if pos < max {
            self.src[pos..].chars().next().unwrap_or(' ')
        } else {
            ' '
        };

        let is_last_punct = is_punct_char(last_char);
        let is_next_punct = is_punct_char(next_char);
        let is_last_white = is_white_space(last_char);
        let is_next_white = is_white_space(next_char);

        let left_flanking =
            !is_next_white && (!is_next_punct || is_last_white || is_last_punct);
        let right_flanking =
            !is_last_white && (!is_last_punct || is_next_white || is_next_punct);

        let can_open = left_flanking && (can_split_word || !right_flanking || is_last_punct);
        let can_close = right_flanking && (can_split_word || !left_flanking || is_next_punct);

        DelimiterRun {
            can_open,
            can_close,
            length,
        }
    }
}
