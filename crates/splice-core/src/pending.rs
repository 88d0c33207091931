//! One-event lookahead buffer
//!
//! Both the splice engine and the document pruner hold back the most recent
//! event so a later decision can still drop it.

use crate::event::Event;

/// Holds at most one pending output event
#[derive(Debug, Default)]
pub struct PendingSlot {
    event: Option<Event>,
}

impl PendingSlot {
    /// Create empty slot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `event`, handing back the previously held event for output
    #[inline]
    #[must_use = "the displaced event must be emitted"]
    pub fn push(&mut self, event: Event) -> Option<Event> {
        self.event.replace(event)
    }

    /// Release the held event for output
    #[inline]
    pub fn flush(&mut self) -> Option<Event> {
        self.event.take()
    }

    /// Drop the held event without emitting it
    ///
    /// Returns what was dropped so callers can validate or log it.
    #[inline]
    pub fn discard(&mut self) -> Option<Event> {
        self.event.take()
    }

    /// Held event
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// Nothing held
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event.is_none()
    }
}
