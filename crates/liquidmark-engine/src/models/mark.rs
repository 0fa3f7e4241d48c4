use std::fmt;

/// Inline formatting attached to text and inline leaf nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mark {
    Em,
    Strong,
    Link { href: String, title: Option<String> },
    Code,
    /// A template tag; the marked text is the tag, delimiters included
    Liquid,
}

/// Mark type without attributes, ordered by schema rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkType {
    Em,
    Strong,
    Link,
    Code,
    Liquid,
}

/// Schema properties of a mark type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkSpec {
    /// Text typed at the end boundary of the mark receives the mark
    pub inclusive: bool,
    /// One element may span several adjacent inline nodes
    pub spanning: bool,
    /// HTML element name
    pub element: &'static str,
}

impl MarkType {
    pub fn spec(self) -> MarkSpec {
        match self {
            MarkType::Em => MarkSpec {
                inclusive: true,
                spanning: true,
                element: "em",
            },
            MarkType::Strong => MarkSpec {
                inclusive: true,
                spanning: true,
                element: "strong",
            },
            MarkType::Link => MarkSpec {
                inclusive: false,
                spanning: true,
                element: "a",
            },
            MarkType::Code => MarkSpec {
                inclusive: true,
                spanning: true,
                element: "code",
            },
            MarkType::Liquid => MarkSpec {
                inclusive: false,
                spanning: false,
                element: "liquid",
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MarkType::Em => "em",
            MarkType::Strong => "strong",
            MarkType::Link => "link",
            MarkType::Code => "code",
            MarkType::Liquid => "liquid",
        }
    }
}

impl Mark {
    pub fn mark_type(&self) -> MarkType {
        match self {
            Mark::Em => MarkType::Em,
            Mark::Strong => MarkType::Strong,
            Mark::Link { .. } => MarkType::Link,
            Mark::Code => MarkType::Code,
            Mark::Liquid => MarkType::Liquid,
        }
    }

    pub fn spec(&self) -> MarkSpec {
        self.mark_type().spec()
    }

    /// Add this mark to a sorted mark set, replacing any mark of the same
    /// type.
    pub fn add_to_set(&self, set: &[Mark]) -> Vec<Mark> {
        let ty = self.mark_type();
        let mut out: Vec<Mark> = set
            .iter()
            .filter(|mark| mark.mark_type() != ty)
            .cloned()
            .collect();
        let index = out
            .iter()
            .position(|mark| mark.mark_type() > ty)
            .unwrap_or(out.len());
        out.insert(index, self.clone());
        out
    }

    /// Remove this exact mark from a set.
    pub fn remove_from_set(&self, set: &[Mark]) -> Vec<Mark> {
        set.iter().filter(|mark| *mark != self).cloned().collect()
    }

    pub fn is_in_set(&self, set: &[Mark]) -> bool {
        set.contains(self)
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Link { href, title: None } => write!(f, "link({href:?})"),
            Mark::Link {
                href,
                title: Some(title),
            } => write!(f, "link({href:?}, {title:?})"),
            other => f.write_str(other.mark_type().name()),
        }
    }
}
