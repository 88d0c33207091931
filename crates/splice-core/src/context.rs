//! Enclosing-structure bookkeeping
//!
//! [`ContextStack`] mirrors the open start events of the stream. Mapping
//! frames also count completed child nodes, which tells key positions (even
//! count) from value positions (odd count).

use crate::error::{Result, SpliceError};
use crate::event::{Event, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Stream,
    Document,
    Container(NodeKind),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    children: usize,
}

/// Stack of currently open structures
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    /// Create empty stack
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Note an event before it is processed: start events push a frame
    pub fn enter(&mut self, event: &Event) {
        let kind = match event {
            Event::StreamStart => FrameKind::Stream,
            Event::DocumentStart { .. } => FrameKind::Document,
            Event::MappingStart(_) => FrameKind::Container(NodeKind::Mapping),
            Event::SequenceStart(_) => FrameKind::Container(NodeKind::Sequence),
            _ => return,
        };
        self.frames.push(Frame { kind, children: 0 });
    }

    /// Note an event after it is processed: end events pop their frame,
    /// completed nodes count towards the parent
    ///
    /// # Errors
    /// - `SpliceError::Unbalanced` if an end event does not match the open frame
    pub fn leave(&mut self, event: &Event) -> Result<()> {
        let expected = match event {
            Event::StreamEnd => FrameKind::Stream,
            Event::DocumentEnd { .. } => FrameKind::Document,
            Event::MappingEnd => FrameKind::Container(NodeKind::Mapping),
            Event::SequenceEnd => FrameKind::Container(NodeKind::Sequence),
            Event::Scalar(_) | Event::Alias { .. } => {
                self.complete_node();
                return Ok(());
            }
            _ => return Ok(()),
        };

        match self.frames.pop() {
            Some(frame) if frame.kind == expected => {
                if matches!(expected, FrameKind::Container(_)) {
                    self.complete_node();
                }
                Ok(())
            }
            Some(frame) => Err(SpliceError::Unbalanced(format!(
                "{} closes an open {:?}",
                event.describe(),
                frame.kind
            ))),
            None => Err(SpliceError::Unbalanced(format!(
                "{} without a matching start",
                event.describe()
            ))),
        }
    }

    /// Container directly enclosing the current position
    ///
    /// `None` at stream or document level.
    #[inline]
    #[must_use]
    pub fn enclosing(&self) -> Option<NodeKind> {
        match self.frames.last()?.kind {
            FrameKind::Container(kind) => Some(kind),
            FrameKind::Stream | FrameKind::Document => None,
        }
    }

    /// Current position is a mapping key
    #[inline]
    #[must_use]
    pub fn at_key_position(&self) -> bool {
        self.frames.last().is_some_and(|frame| {
            frame.kind == FrameKind::Container(NodeKind::Mapping) && frame.children % 2 == 0
        })
    }

    /// Number of open frames
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// No open frames
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn complete_node(&mut self) {
        if let Some(parent) = self.frames.last_mut() {
            parent.children += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(stack: &mut ContextStack, event: &Event) {
        stack.enter(event);
        stack.leave(event).unwrap();
    }

    #[test]
    fn empty_stack_is_top_level() {
        let stack = ContextStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.enclosing(), None);
        assert!(!stack.at_key_position());
    }

    #[test]
    fn document_level_has_no_enclosing_container() {
        let mut stack = ContextStack::new();
        feed(&mut stack, &Event::StreamStart);
        feed(&mut stack, &Event::document_start());
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.enclosing(), None);
    }

    #[test]
    fn start_is_visible_while_processing_it() {
        let mut stack = ContextStack::new();
        let start = Event::sequence_start();
        stack.enter(&start);
        assert_eq!(stack.enclosing(), Some(NodeKind::Sequence));
        stack.leave(&start).unwrap();
        assert_eq!(stack.enclosing(), Some(NodeKind::Sequence));
    }

    #[test]
    fn end_pops_after_processing() {
        let mut stack = ContextStack::new();
        feed(&mut stack, &Event::mapping_start());
        feed(&mut stack, &Event::sequence_start());

        let end = Event::SequenceEnd;
        stack.enter(&end);
        assert_eq!(stack.enclosing(), Some(NodeKind::Sequence));
        stack.leave(&end).unwrap();
        assert_eq!(stack.enclosing(), Some(NodeKind::Mapping));
    }

    #[test]
    fn key_and_value_positions_alternate() {
        let mut stack = ContextStack::new();
        feed(&mut stack, &Event::mapping_start());
        assert!(stack.at_key_position());

        feed(&mut stack, &Event::scalar("k"));
        assert!(!stack.at_key_position());

        // nested value counts once, when it closes
        feed(&mut stack, &Event::sequence_start());
        feed(&mut stack, &Event::scalar("a"));
        feed(&mut stack, &Event::scalar("b"));
        assert!(!stack.at_key_position());
        feed(&mut stack, &Event::SequenceEnd);
        assert!(stack.at_key_position());

        feed(&mut stack, &Event::scalar("k2"));
        feed(&mut stack, &Event::Alias { anchor: "x".into() });
        assert!(stack.at_key_position());
    }

    #[test]
    fn sequences_have_no_key_positions() {
        let mut stack = ContextStack::new();
        feed(&mut stack, &Event::sequence_start());
        assert!(!stack.at_key_position());
        feed(&mut stack, &Event::scalar("a"));
        assert!(!stack.at_key_position());
    }

    #[test]
    fn mismatched_end_is_rejected() {
        let mut stack = ContextStack::new();
        feed(&mut stack, &Event::mapping_start());
        let err = stack.leave(&Event::SequenceEnd).unwrap_err();
        assert!(matches!(err, SpliceError::Unbalanced(_)));
    }

    #[test]
    fn end_without_start_is_rejected() {
        let mut stack = ContextStack::new();
        assert!(stack.leave(&Event::MappingEnd).is_err());
    }
}
