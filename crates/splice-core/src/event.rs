//! Document events
//!
//! SAX-style event model: structure is represented by start/end pairs and
//! nothing is accumulated. Events carry enough presentation metadata
//! (anchors, tags, styles) to be written back out unchanged.
//!
//! A one-entry mapping `{k: v}` inside one document arrives as:
//!
//! ```text
//! StreamStart
//! DocumentStart
//! MappingStart
//! Scalar("k")
//! Scalar("v")
//! MappingEnd
//! DocumentEnd
//! StreamEnd
//! ```

use std::fmt;

/// Presentation style of a scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    /// Let the emitter choose
    #[default]
    Any,
    /// Unquoted
    Plain,
    /// `'single quoted'`
    SingleQuoted,
    /// `"double quoted"`
    DoubleQuoted,
    /// `|` block literal
    Literal,
    /// `>` block folded
    Folded,
}

/// Presentation style of a mapping or sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionStyle {
    /// Let the emitter choose
    #[default]
    Any,
    /// Indentation based
    Block,
    /// `[...]` / `{...}`
    Flow,
}

/// Kind of container a position can sit in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Key/value pairs
    Mapping,
    /// Ordered items
    Sequence,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapping => f.write_str("mapping"),
            Self::Sequence => f.write_str("sequence"),
        }
    }
}

/// Scalar node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    /// Scalar text
    pub value: String,
    /// Anchor name (`&name`)
    pub anchor: Option<String>,
    /// Resolved tag
    pub tag: Option<String>,
    /// Tag may be omitted for the plain style
    pub plain_implicit: bool,
    /// Tag may be omitted for any non-plain style
    pub quoted_implicit: bool,
    /// Presentation style
    pub style: ScalarStyle,
}

impl Scalar {
    /// Untagged scalar, emitter picks the style
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            anchor: None,
            tag: None,
            plain_implicit: true,
            quoted_implicit: true,
            style: ScalarStyle::Any,
        }
    }
}

/// Start of a mapping or sequence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionStart {
    /// Anchor name (`&name`)
    pub anchor: Option<String>,
    /// Resolved tag
    pub tag: Option<String>,
    /// Tag may be omitted
    pub implicit: bool,
    /// Presentation style
    pub style: CollectionStyle,
}

impl CollectionStart {
    /// Untagged collection, emitter picks the style
    #[must_use]
    pub fn new() -> Self {
        Self {
            implicit: true,
            ..Self::default()
        }
    }
}

/// One atomic unit of a parse stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Stream opened
    StreamStart,
    /// Stream closed
    StreamEnd,
    /// Document opened (`---` when not implicit)
    DocumentStart {
        /// No explicit `---` marker
        implicit: bool,
    },
    /// Document closed (`...` when not implicit)
    DocumentEnd {
        /// No explicit `...` marker
        implicit: bool,
    },
    /// Mapping opened
    MappingStart(CollectionStart),
    /// Mapping closed
    MappingEnd,
    /// Sequence opened
    SequenceStart(CollectionStart),
    /// Sequence closed
    SequenceEnd,
    /// Scalar value
    Scalar(Scalar),
    /// Reference to an anchored node (`*name`)
    Alias {
        /// Referenced anchor
        anchor: String,
    },
}

impl Event {
    /// Untagged scalar event
    #[inline]
    #[must_use]
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::new(value))
    }

    /// Untagged mapping start
    #[inline]
    #[must_use]
    pub fn mapping_start() -> Self {
        Self::MappingStart(CollectionStart::new())
    }

    /// Untagged sequence start
    #[inline]
    #[must_use]
    pub fn sequence_start() -> Self {
        Self::SequenceStart(CollectionStart::new())
    }

    /// Implicit document start
    #[inline]
    #[must_use]
    pub fn document_start() -> Self {
        Self::DocumentStart { implicit: true }
    }

    /// Implicit document end
    #[inline]
    #[must_use]
    pub fn document_end() -> Self {
        Self::DocumentEnd { implicit: true }
    }

    /// Container kind opened by this event, if it opens one
    #[inline]
    #[must_use]
    pub fn container_kind(&self) -> Option<NodeKind> {
        match self {
            Self::MappingStart(_) => Some(NodeKind::Mapping),
            Self::SequenceStart(_) => Some(NodeKind::Sequence),
            _ => None,
        }
    }

    /// Text of a scalar event
    #[inline]
    #[must_use]
    pub fn scalar_text(&self) -> Option<&str> {
        match self {
            Self::Scalar(scalar) => Some(&scalar.value),
            _ => None,
        }
    }

    /// Short name used in diagnostics
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::StreamStart => "stream start",
            Self::StreamEnd => "stream end",
            Self::DocumentStart { .. } => "document start",
            Self::DocumentEnd { .. } => "document end",
            Self::MappingStart(_) => "mapping",
            Self::MappingEnd => "mapping end",
            Self::SequenceStart(_) => "sequence",
            Self::SequenceEnd => "sequence end",
            Self::Scalar(_) => "scalar",
            Self::Alias { .. } => "alias",
        }
    }
}
