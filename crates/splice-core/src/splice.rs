//! The splice engine
//!
//! [`Splice`] wraps a fallible event iterator and rewrites it in a single
//! forward pass. Ordinary events go through the one-event [`PendingSlot`];
//! marker scalars are evaluated on the spot and replaced according to their
//! mode:
//!
//! | Mode | Needs | Drops the pending key | Replacement |
//! |------|-------|-----------------------|-------------|
//! | `*` suppress | no value | inside a mapping | nothing |
//! | `@` splice | a value | inside a mapping | members of the produced collection |
//! | `!` inline | a value | never | the produced value |
//!
//! The pending slot holds the key of a mapping entry while its value is
//! examined, which is what lets suppress and splice remove that key.

use crate::context::ContextStack;
use crate::error::{Result, SpliceError};
use crate::evaluate::{Evaluation, Evaluator};
use crate::event::{Event, NodeKind};
use crate::marker::{self, Marker, Mode, DEFAULT_TARGET};
use crate::pending::PendingSlot;
use crate::trim::{Trim, TrimMode};
use std::collections::VecDeque;

type Replacement = Trim<std::vec::IntoIter<Event>>;

/// What a marker turns into
#[derive(Debug)]
struct Substitution {
    drop_pending: bool,
    events: Option<Replacement>,
}

/// Streaming splice engine over a source of parse events
#[derive(Debug)]
pub struct Splice<I, E> {
    source: I,
    evaluator: E,
    default_target: String,
    context: ContextStack,
    pending: PendingSlot,
    ready: VecDeque<Event>,
    active: Option<Replacement>,
    evaluated: usize,
    finished: bool,
}

impl<I, E> Splice<I, E>
where
    I: Iterator<Item = Result<Event>>,
    E: Evaluator,
{
    /// Create engine reading from `source`, evaluating markers with `evaluator`
    pub fn new(source: impl IntoIterator<IntoIter = I>, evaluator: E) -> Self {
        Self {
            source: source.into_iter(),
            evaluator,
            default_target: DEFAULT_TARGET.to_string(),
            context: ContextStack::new(),
            pending: PendingSlot::new(),
            ready: VecDeque::new(),
            active: None,
            evaluated: 0,
            finished: false,
        }
    }

    /// Target used for markers that name none
    #[inline]
    #[must_use]
    pub fn with_default_target(mut self, target: impl Into<String>) -> Self {
        self.default_target = target.into();
        self
    }

    /// Markers evaluated so far
    #[inline]
    #[must_use]
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Process one source event
    fn step(&mut self, event: Event) -> Result<()> {
        self.context.enter(&event);

        let substitution = match marker::detect(&event) {
            Some(marker) => Some(self.substitute(&marker)?),
            None => None,
        };

        self.context.leave(&event)?;

        match substitution {
            None => {
                if let Some(previous) = self.pending.push(event) {
                    self.ready.push_back(previous);
                }
            }
            Some(Substitution {
                drop_pending,
                events,
            }) => {
                if drop_pending {
                    match self.pending.discard() {
                        Some(Event::Scalar(_) | Event::Alias { .. }) => {}
                        // the key was itself replaced by a marker's output
                        None => {
                            return Err(SpliceError::unexpected(
                                "a literal mapping key before the marker",
                                "a key produced by another marker",
                            ))
                        }
                        Some(other) => {
                            return Err(SpliceError::unexpected(
                                "a scalar mapping key before the marker",
                                other.describe(),
                            ))
                        }
                    }
                } else if let Some(previous) = self.pending.flush() {
                    self.ready.push_back(previous);
                }
                self.active = events;
            }
        }
        Ok(())
    }

    /// Evaluate a marker and decide how it is merged
    fn substitute(&mut self, marker: &Marker<'_>) -> Result<Substitution> {
        let enclosing = self.context.enclosing();

        if marker.mode != Mode::Inline && self.context.at_key_position() {
            return Err(SpliceError::unexpected(
                format!("{} marker in a value position", marker.mode),
                "mapping key position",
            ));
        }
        let splice_kind = match (marker.mode, enclosing) {
            (Mode::Splice, Some(kind)) => Some(kind),
            (Mode::Splice, None) => {
                return Err(SpliceError::unexpected(
                    "an enclosing mapping or sequence to splice into",
                    "document level",
                ))
            }
            _ => None,
        };

        let target = marker.target.unwrap_or(&self.default_target);
        tracing::debug!(
            mode = %marker.mode,
            target,
            body_len = marker.body.len(),
            "evaluating marker"
        );
        let result = self.evaluator.evaluate(target, marker.body)?;
        self.evaluated += 1;

        let in_mapping = enclosing == Some(NodeKind::Mapping);
        match (marker.mode, result) {
            (Mode::Suppress, Evaluation::NoValue) => Ok(Substitution {
                drop_pending: in_mapping,
                events: None,
            }),
            (Mode::Suppress, Evaluation::Events(_)) => {
                Err(SpliceError::unexpected("no value", "a value"))
            }
            (Mode::Splice, Evaluation::Events(events)) => {
                let kind = splice_kind.unwrap_or(NodeKind::Sequence);
                Ok(Substitution {
                    drop_pending: in_mapping,
                    events: Some(Trim::new(events, TrimMode::Container(kind))),
                })
            }
            (Mode::Inline, Evaluation::Events(events)) => Ok(Substitution {
                drop_pending: false,
                events: Some(Trim::new(events, TrimMode::Document)),
            }),
            (Mode::Splice | Mode::Inline, Evaluation::NoValue) => {
                Err(SpliceError::unexpected("a value", "no value"))
            }
        }
    }

    fn fuse(&mut self) {
        self.finished = true;
        self.active = None;
        self.ready.clear();
        let _ = self.pending.discard();
    }
}

impl<I, E> Iterator for Splice<I, E>
where
    I: Iterator<Item = Result<Event>>,
    E: Evaluator,
{
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(Ok(event));
            }
            if let Some(active) = self.active.as_mut() {
                match active.next() {
                    Some(Ok(event)) => return Some(Ok(event)),
                    Some(Err(err)) => {
                        self.fuse();
                        return Some(Err(err));
                    }
                    None => {
                        self.active = None;
                        continue;
                    }
                }
            }
            if self.finished {
                return None;
            }

            match self.source.next() {
                None => {
                    self.finished = true;
                    return self.pending.flush().map(Ok);
                }
                Some(Err(err)) => {
                    self.fuse();
                    return Some(Err(err));
                }
                Some(Ok(event)) => {
                    if let Err(err) = self.step(event) {
                        self.fuse();
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}
