//! Empty-document removal
//!
//! A document whose only value was suppressed leaves a bare
//! `DocumentStart, DocumentEnd` pair behind. [`Prune`] drops such pairs
//! and passes everything else through unchanged.

use crate::error::Result;
use crate::event::Event;
use crate::pending::PendingSlot;

/// Iterator adapter removing empty documents
#[derive(Debug)]
pub struct Prune<I> {
    source: I,
    pending: PendingSlot,
    pruned: usize,
    finished: bool,
}

impl<I> Prune<I>
where
    I: Iterator<Item = Result<Event>>,
{
    /// Wrap `source`
    pub fn new(source: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            source: source.into_iter(),
            pending: PendingSlot::new(),
            pruned: 0,
            finished: false,
        }
    }

    /// Documents dropped so far
    #[inline]
    #[must_use]
    pub fn pruned(&self) -> usize {
        self.pruned
    }
}

impl<I> Iterator for Prune<I>
where
    I: Iterator<Item = Result<Event>>,
{
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            match self.source.next() {
                None => {
                    self.finished = true;
                    return self.pending.flush().map(Ok);
                }
                Some(Err(err)) => {
                    self.finished = true;
                    let _ = self.pending.discard();
                    return Some(Err(err));
                }
                Some(Ok(event)) => {
                    if matches!(event, Event::DocumentEnd { .. })
                        && matches!(self.pending.peek(), Some(Event::DocumentStart { .. }))
                    {
                        let _ = self.pending.discard();
                        self.pruned += 1;
                        tracing::trace!("pruned empty document");
                        continue;
                    }
                    if let Some(previous) = self.pending.push(event) {
                        return Some(Ok(previous));
                    }
                }
            }
        }
    }
}
