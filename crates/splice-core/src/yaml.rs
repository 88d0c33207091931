//! YAML text boundary
//!
//! Converts between YAML text and [`Event`] streams using libyaml-safer.
//! Version and tag directives are not carried across; tags on nodes are
//! kept in their resolved form.

use crate::error::Result;
use crate::event::{CollectionStart, CollectionStyle, Event, Scalar, ScalarStyle};
use libyaml_safer::{
    Emitter, Encoding, Event as RawEvent, EventData, MappingStyle, Parser,
    ScalarStyle as RawScalarStyle, SequenceStyle,
};

/// Streaming reader yielding events parsed from YAML text
///
/// Ends after `StreamEnd` and after the first error.
pub struct EventReader<'r> {
    parser: Parser<'r>,
    done: bool,
}

impl<'r> EventReader<'r> {
    /// Read events from `input`
    #[must_use]
    pub fn new(input: &'r mut &'r [u8]) -> Self {
        let mut parser = Parser::new();
        parser.set_input_string(input);
        Self {
            parser,
            done: false,
        }
    }
}

impl std::fmt::Debug for EventReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReader")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Iterator for EventReader<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parser.parse() {
            Ok(raw) => {
                let event = Event::from(raw);
                if event == Event::StreamEnd {
                    self.done = true;
                }
                Some(Ok(event))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
        }
    }
}

/// Parse a complete YAML text into its events
///
/// # Errors
/// - `SpliceError::Yaml` if the text is not well-formed YAML
pub fn parse_str(input: &str) -> Result<Vec<Event>> {
    let mut bytes = input.as_bytes();
    EventReader::new(&mut bytes).collect()
}

/// Serialize an event stream to YAML text
///
/// Nothing is returned unless every event was emitted; the first error in
/// `events` aborts serialization.
///
/// # Errors
/// - Any error carried by `events`
/// - `SpliceError::Yaml` if the stream is not a valid event sequence
/// - `SpliceError::Utf8` if the emitter produced invalid UTF-8
pub fn emit<I>(events: I) -> Result<String>
where
    I: IntoIterator<Item = Result<Event>>,
{
    let mut output = Vec::new();
    {
        let mut emitter = Emitter::new();
        emitter.set_output_string(&mut output);
        emitter.set_unicode(true);
        for event in events {
            emitter.emit(event?.to_raw())?;
        }
    }
    Ok(String::from_utf8(output)?)
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        match raw.data {
            EventData::StreamStart { .. } => Self::StreamStart,
            EventData::StreamEnd => Self::StreamEnd,
            EventData::DocumentStart { implicit, .. } => Self::DocumentStart { implicit },
            EventData::DocumentEnd { implicit } => Self::DocumentEnd { implicit },
            EventData::Alias { anchor } => Self::Alias { anchor },
            EventData::Scalar {
                anchor,
                tag,
                value,
                plain_implicit,
                quoted_implicit,
                style,
            } => Self::Scalar(Scalar {
                value,
                anchor,
                tag,
                plain_implicit,
                quoted_implicit,
                style: scalar_style_from(style),
            }),
            EventData::SequenceStart {
                anchor,
                tag,
                implicit,
                style,
            } => Self::SequenceStart(CollectionStart {
                anchor,
                tag,
                implicit,
                style: match style {
                    SequenceStyle::Block => CollectionStyle::Block,
                    SequenceStyle::Flow => CollectionStyle::Flow,
                    _ => CollectionStyle::Any,
                },
            }),
            EventData::SequenceEnd => Self::SequenceEnd,
            EventData::MappingStart {
                anchor,
                tag,
                implicit,
                style,
            } => Self::MappingStart(CollectionStart {
                anchor,
                tag,
                implicit,
                style: match style {
                    MappingStyle::Block => CollectionStyle::Block,
                    MappingStyle::Flow => CollectionStyle::Flow,
                    _ => CollectionStyle::Any,
                },
            }),
            EventData::MappingEnd => Self::MappingEnd,
        }
    }
}

impl Event {
    /// Convert into the emitter's event representation
    #[must_use]
    pub fn to_raw(&self) -> RawEvent {
        match self {
            Self::StreamStart => RawEvent::stream_start(Encoding::Utf8),
            Self::StreamEnd => RawEvent::stream_end(),
            Self::DocumentStart { implicit } => RawEvent::document_start(None, &[], *implicit),
            Self::DocumentEnd { implicit } => RawEvent::document_end(*implicit),
            Self::Alias { anchor } => RawEvent::alias(anchor),
            Self::Scalar(scalar) => RawEvent::scalar(
                scalar.anchor.as_deref(),
                scalar.tag.as_deref(),
                &scalar.value,
                scalar.plain_implicit,
                scalar.quoted_implicit,
                scalar_style_to(scalar.style),
            ),
            Self::SequenceStart(start) => RawEvent::sequence_start(
                start.anchor.as_deref(),
                start.tag.as_deref(),
                start.implicit,
                match start.style {
                    CollectionStyle::Any => SequenceStyle::Any,
                    CollectionStyle::Block => SequenceStyle::Block,
                    CollectionStyle::Flow => SequenceStyle::Flow,
                },
            ),
            Self::SequenceEnd => RawEvent::sequence_end(),
            Self::MappingStart(start) => RawEvent::mapping_start(
                start.anchor.as_deref(),
                start.tag.as_deref(),
                start.implicit,
                match start.style {
                    CollectionStyle::Any => MappingStyle::Any,
                    CollectionStyle::Block => MappingStyle::Block,
                    CollectionStyle::Flow => MappingStyle::Flow,
                },
            ),
            Self::MappingEnd => RawEvent::mapping_end(),
        }
    }
}

fn scalar_style_from(style: RawScalarStyle) -> ScalarStyle {
    match style {
        RawScalarStyle::Plain => ScalarStyle::Plain,
        RawScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        RawScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        RawScalarStyle::Literal => ScalarStyle::Literal,
        RawScalarStyle::Folded => ScalarStyle::Folded,
        _ => ScalarStyle::Any,
    }
}

fn scalar_style_to(style: ScalarStyle) -> RawScalarStyle {
    match style {
        ScalarStyle::Any => RawScalarStyle::Any,
        ScalarStyle::Plain => RawScalarStyle::Plain,
        ScalarStyle::SingleQuoted => RawScalarStyle::SingleQuoted,
        ScalarStyle::DoubleQuoted => RawScalarStyle::DoubleQuoted,
        ScalarStyle::Literal => RawScalarStyle::Literal,
        ScalarStyle::Folded => RawScalarStyle::Folded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpliceError;

    fn values(events: &[Event]) -> Vec<&str> {
        events.iter().filter_map(Event::scalar_text).collect()
    }

    #[test]
    fn parses_block_mapping() {
        let events = parse_str("a: 1\nb: [x, y]\n").unwrap();
        assert_eq!(events.first(), Some(&Event::StreamStart));
        assert_eq!(events.last(), Some(&Event::StreamEnd));
        assert_eq!(values(&events), vec!["a", "1", "b", "x", "y"]);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::SequenceStart(s) if s.style == CollectionStyle::Flow)));
    }

    #[test]
    fn keeps_scalar_style_and_anchor() {
        let events = parse_str("- &a 'quoted'\n- *a\n").unwrap();
        let Some(Event::Scalar(scalar)) = events.iter().find(|e| e.scalar_text().is_some()) else {
            panic!("no scalar in {events:?}");
        };
        assert_eq!(scalar.value, "quoted");
        assert_eq!(scalar.anchor.as_deref(), Some("a"));
        assert_eq!(scalar.style, ScalarStyle::SingleQuoted);
        assert!(events.contains(&Event::Alias { anchor: "a".into() }));
    }

    #[test]
    fn empty_input_is_an_empty_stream() {
        let events = parse_str("").unwrap();
        assert_eq!(events, vec![Event::StreamStart, Event::StreamEnd]);
    }

    #[test]
    fn malformed_input_is_an_error() {
        let err = parse_str("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, SpliceError::Yaml(_)));
    }

    #[test]
    fn reader_stops_after_error() {
        let mut bytes: &[u8] = b"key: \"unterminated\n";
        let results: Vec<_> = EventReader::new(&mut bytes).collect();
        assert!(results.last().is_some_and(Result::is_err));
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn emit_round_trips_text() {
        let input = "a: 1\nb:\n- x\n- y\n";
        let events = parse_str(input).unwrap();
        let output = emit(events.into_iter().map(Ok)).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn emit_stops_at_first_error() {
        let events = vec![Ok(Event::StreamStart), Err(SpliceError::MultiDocument)];
        assert!(matches!(emit(events), Err(SpliceError::MultiDocument)));
    }

    #[test]
    fn emit_rejects_invalid_sequence() {
        let events = vec![Ok(Event::StreamStart), Ok(Event::MappingEnd)];
        assert!(emit(events).is_err());
    }
}
