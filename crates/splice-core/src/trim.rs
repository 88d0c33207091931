//! Boundary trimming for produced sub-streams
//!
//! A produced value usually arrives wrapped in its own stream and document
//! boundaries. [`Trim`] strips the leading boundary events, holds back the
//! same number of trailing events, and yields only the interior. It is
//! lazy and single pass: the head is validated on the first call to
//! `next`, and the held-back tail is dropped when the input runs out.

use crate::error::{Result, SpliceError};
use crate::event::{Event, NodeKind};
use std::collections::VecDeque;
use std::iter::Peekable;

/// Which boundary to remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimMode {
    /// Remove the value's own container so its members merge into the
    /// surrounding container of the same kind
    Container(NodeKind),
    /// Remove stream and document framing, keeping the value whole
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Head,
    Tail,
    Done,
}

/// Iterator over the interior events of a produced sub-stream
#[derive(Debug)]
pub struct Trim<I: Iterator<Item = Event>> {
    inner: Peekable<I>,
    mode: TrimMode,
    phase: Phase,
    lead: usize,
    tail: VecDeque<Event>,
}

impl<I: Iterator<Item = Event>> Trim<I> {
    /// Trim `events` according to `mode`
    pub fn new(events: impl IntoIterator<IntoIter = I>, mode: TrimMode) -> Self {
        Self {
            inner: events.into_iter().peekable(),
            mode,
            phase: Phase::Head,
            lead: 0,
            tail: VecDeque::new(),
        }
    }

    /// Consume the leading boundary events, counting them in `lead`
    fn consume_head(&mut self) -> Result<()> {
        match self.mode {
            TrimMode::Container(kind) => loop {
                let Some(event) = self.inner.next() else {
                    return Err(SpliceError::unexpected(kind.to_string(), "nothing"));
                };
                self.lead += 1;
                match event {
                    Event::StreamStart | Event::DocumentStart { .. } => continue,
                    other if other.container_kind() == Some(kind) => return Ok(()),
                    other => {
                        return Err(SpliceError::unexpected(kind.to_string(), other.describe()))
                    }
                }
            },
            TrimMode::Document => {
                while self.inner.next_if(|e| matches!(e, Event::StreamStart)).is_some() {
                    self.lead += 1;
                }
                if self
                    .inner
                    .next_if(|e| matches!(e, Event::DocumentStart { .. }))
                    .is_some()
                {
                    self.lead += 1;
                }
                match self.inner.peek() {
                    None | Some(Event::DocumentEnd { .. } | Event::StreamEnd) => {
                        Err(SpliceError::unexpected("a value", "nothing"))
                    }
                    Some(_) => Ok(()),
                }
            }
        }
    }
}

impl<I: Iterator<Item = Event>> Iterator for Trim<I> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.phase == Phase::Head {
            if let Err(err) = self.consume_head() {
                self.phase = Phase::Done;
                return Some(Err(err));
            }
            self.phase = Phase::Tail;
        }
        if self.phase == Phase::Done {
            return None;
        }

        loop {
            let Some(event) = self.inner.next() else {
                // whatever is still held back is the trailing boundary
                self.phase = Phase::Done;
                self.tail.clear();
                return None;
            };
            self.tail.push_back(event);
            if self.tail.len() > self.lead {
                let out = self.tail.pop_front()?;
                if matches!(out, Event::DocumentEnd { .. }) {
                    self.phase = Phase::Done;
                    return Some(Err(SpliceError::MultiDocument));
                }
                return Some(Ok(out));
            }
        }
    }
}
