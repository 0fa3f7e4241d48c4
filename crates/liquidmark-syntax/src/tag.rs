//! Template tag delimiters.
//!
//! Two forms exist: expression tags `{{ ... }}` and statement tags
//! `{% ... %}`. The opener is recognized from its first two characters; the
//! closer is always the designated closing character immediately followed
//! by `}`.

use std::ops::Range;

/// The two template tag forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `{{ expression }}`
    Expression,
    /// `{% statement %}`
    Statement,
}

impl TagKind {
    /// Detect a tag opener at `pos`.
    ///
    /// `{` followed by `{` or `%` selects the kind; anything else is not a
    /// tag and costs no scanning.
    pub fn at(src: &[u8], pos: usize) -> Option<Self> {
        if src.get(pos) != Some(&b'{') {
            return None;
        }
        match src.get(pos + 1) {
            Some(b'{') => Some(TagKind::Expression),
            Some(b'%') => Some(TagKind::Statement),
            _ => None,
        }
    }

    pub fn open_delimiter(self) -> &'static str {
        match self {
            TagKind::Expression => "{{",
            TagKind::Statement => "{%",
        }
    }

    pub fn close_delimiter(self) -> &'static str {
        match self {
            TagKind::Expression => "}}",
            TagKind::Statement => "%}",
        }
    }

    /// First byte of the closing delimiter.
    pub fn closing_char(self) -> u8 {
        match self {
            TagKind::Expression => b'}',
            TagKind::Statement => b'%',
        }
    }

    /// Whether the two-byte closer starts at `pos` and ends before `max`.
    pub fn is_closer_at(self, src: &[u8], pos: usize, max: usize) -> bool {
        pos + 1 < max && src[pos] == self.closing_char() && src[pos + 1] == b'}'
    }

    pub fn name(self) -> &'static str {
        match self {
            TagKind::Expression => "expression",
            TagKind::Statement => "statement",
        }
    }
}

/// One template tag occurrence in a source buffer.
///
/// `raw` always starts with the opener and ends with the matching closer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTag<'a> {
    pub kind: TagKind,
    pub raw: &'a str,
    pub span: Range<usize>,
}

impl<'a> TemplateTag<'a> {
    /// Scan character by character for a complete tag starting at `start`.
    ///
    /// The first closer found ends the tag. Returns `None` if `start` is not
    /// an opener or no closer exists before `max`.
    pub fn scan(src: &'a str, start: usize, max: usize) -> Option<Self> {
        let bytes = src.as_bytes();
        let kind = TagKind::at(bytes, start)?;
        let max = max.min(bytes.len());

        let mut pos = start + 2;
        while pos < max {
            if kind.is_closer_at(bytes, pos, max) {
                let end = pos + 2;
                return Some(Self {
                    kind,
                    raw: &src[start..end],
                    span: start..end,
                });
            }
            pos += 1;
        }
        None
    }

    /// Interpret `raw` as exactly one tag, with nothing before or after it.
    pub fn from_raw(raw: &'a str) -> Option<Self> {
        Self::scan(raw, 0, raw.len()).filter(|tag| tag.span.end == raw.len())
    }

    pub fn open_delimiter(&self) -> &'static str {
        self.kind.open_delimiter()
    }

    pub fn close_delimiter(&self) -> &'static str {
        self.kind.close_delimiter()
    }

    /// Text between the delimiters, untrimmed.
    pub fn body(&self) -> &'a str {
        &self.raw[2..self.raw.len() - 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("{{ x }}", Some(TagKind::Expression))]
    #[case("{% if x %}", Some(TagKind::Statement))]
    #[case("{$ x $}", None)]
    #[case("{ x }", None)]
    #[case("{", None)]
    #[case("x", None)]
    fn opener_detection(#[case] src: &str, #[case] expected: Option<TagKind>) {
        assert_eq!(TagKind::at(src.as_bytes(), 0), expected);
    }

    #[test]
    fn scan_finds_first_closer() {
        let tag = TemplateTag::scan("{{ a }} and {{ b }}", 0, 19).unwrap();
        assert_eq!(tag.raw, "{{ a }}");
        assert_eq!(tag.span, 0..7);
        assert_eq!(tag.body(), " a ");
    }

    #[test]
    fn lone_brace_inside_expression_is_not_a_closer() {
        let src = "{{ a } b }}";
        let tag = TemplateTag::scan(src, 0, src.len()).unwrap();
        assert_eq!(tag.raw, src);
    }

    #[test]
    fn statement_needs_percent_brace() {
        let src = "{% if a }} %}";
        let tag = TemplateTag::scan(src, 0, src.len()).unwrap();
        assert_eq!(tag.raw, src);
        assert_eq!(tag.open_delimiter(), "{%");
        assert_eq!(tag.close_delimiter(), "%}");
    }

    #[test]
    fn empty_bodies_are_tags() {
        assert_eq!(TemplateTag::from_raw("{{}}").unwrap().body(), "");
        assert_eq!(TemplateTag::from_raw("{%%}").unwrap().body(), "");
    }

    #[test]
    fn unterminated_tag_is_rejected() {
        let src = "{{ unterminated";
        assert_eq!(TemplateTag::scan(src, 0, src.len()), None);
    }

    #[test]
    fn closer_must_fit_before_max() {
        let src = "{{ x }}";
        assert_eq!(TemplateTag::scan(src, 0, 6), None);
    }

    #[test]
    fn from_raw_rejects_trailing_text() {
        assert_eq!(TemplateTag::from_raw("{{ x }} y"), None);
    }
}
