//! Substitution marker detection
//!
//! A scalar is a marker when its whole text matches
//! `(` MODE [TARGET] WS BODY MODE `)` WS*, with the same MODE character
//! opening and closing. Text that fails the match, including text with a
//! mismatched closing mode, is ordinary content.
//!
//! ```text
//! (*py import os*)        suppress: evaluate for effect only
//! (@py {'a': 1}@)         splice: merge members into the enclosing container
//! (!py 2 + 2!)            inline: replace this value
//! (! 2 + 2!)              no target: the default target is used
//! ```

use crate::event::Event;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Target used when a marker names none
pub const DEFAULT_TARGET: &str = "python3";

// The closing mode is captured separately and compared after matching.
static MARKER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A\((?P<open>[*@!])(?P<target>\S+)?\s(?P<body>.*)(?P<close>[*@!])\)\s*\z")
        .expect("marker pattern is a valid regex")
});

/// How a produced value is merged into the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// `*`: evaluate for effect, remove the position
    Suppress,
    /// `@`: merge a produced collection into the enclosing one
    Splice,
    /// `!`: replace the position with the produced value
    Inline,
}

impl Mode {
    /// Mode for a delimiter character
    #[inline]
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '*' => Some(Self::Suppress),
            '@' => Some(Self::Splice),
            '!' => Some(Self::Inline),
            _ => None,
        }
    }

    /// Delimiter character for this mode
    #[inline]
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Suppress => '*',
            Self::Splice => '@',
            Self::Inline => '!',
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suppress => f.write_str("suppress"),
            Self::Splice => f.write_str("splice"),
            Self::Inline => f.write_str("inline"),
        }
    }
}

/// A parsed substitution request, borrowing from the scalar text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Merge policy
    pub mode: Mode,
    /// Explicit target identifier
    pub target: Option<&'a str>,
    /// Code to evaluate
    pub body: &'a str,
}

impl<'a> Marker<'a> {
    /// Explicit target, or `default` when the marker names none
    #[inline]
    #[must_use]
    pub fn target_or(&self, default: &'a str) -> &'a str {
        self.target.unwrap_or(default)
    }
}

/// Parse scalar text as a marker
///
/// Returns `None` for anything that is not a full, well-formed marker.
#[must_use]
pub fn parse(text: &str) -> Option<Marker<'_>> {
    let caps = MARKER_PATTERN.captures(text)?;
    let open = caps.name("open")?.as_str();
    if caps.name("close")?.as_str() != open {
        return None;
    }
    let mode = Mode::from_char(open.chars().next()?)?;

    Some(Marker {
        mode,
        target: caps.name("target").map(|m| m.as_str()),
        body: caps.name("body")?.as_str(),
    })
}

/// Classify an event as a marker
///
/// Only scalar events can be markers.
#[inline]
#[must_use]
pub fn detect(event: &Event) -> Option<Marker<'_>> {
    event.scalar_text().and_then(parse)
}
