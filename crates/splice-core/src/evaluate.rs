//! Evaluation gateway contract
//!
//! The splice engine hands each marker's target and body to an
//! [`Evaluator`] and blocks until it answers. Implementations own whatever
//! sessions or processes they need; the engine never retries.

use crate::error::Result;
use crate::event::Event;

/// Outcome of a successful evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The code produced nothing
    NoValue,
    /// Events for exactly one value, optionally wrapped in stream and
    /// document boundaries
    Events(Vec<Event>),
}

/// Executes code for a target identifier
#[cfg_attr(test, mockall::automock)]
pub trait Evaluator {
    /// Evaluate `body` with the session for `target`
    ///
    /// # Errors
    /// - `SpliceError::EvaluationFailure` when the code itself failed
    /// - `SpliceError::Backend` when the session could not run it
    fn evaluate(&mut self, target: &str, body: &str) -> Result<Evaluation>;
}

impl<E: Evaluator + ?Sized> Evaluator for &mut E {
    #[inline]
    fn evaluate(&mut self, target: &str, body: &str) -> Result<Evaluation> {
        (**self).evaluate(target, body)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    #[inline]
    fn evaluate(&mut self, target: &str, body: &str) -> Result<Evaluation> {
        (**self).evaluate(target, body)
    }
}
