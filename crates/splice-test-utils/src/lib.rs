//! Testing utilities for the yaml-splice workspace
//!
//! Event builders, a compact tree notation for comparing streams, and a
//! scripted evaluator that replays canned replies.

#![allow(missing_docs)]

use splice_core::yaml;
use splice_core::{Evaluation, Evaluator, Event, Result, SpliceError};
use std::collections::VecDeque;

/// Wrap `body` in stream and document boundaries
pub fn framed(body: Vec<Event>) -> Vec<Event> {
    let mut events = vec![Event::StreamStart, Event::document_start()];
    events.extend(body);
    events.push(Event::document_end());
    events.push(Event::StreamEnd);
    events
}

/// Same as [`framed`] but as engine input
pub fn framed_ok(body: Vec<Event>) -> Vec<Result<Event>> {
    framed(body).into_iter().map(Ok).collect()
}

/// Parse YAML text, panicking on malformed input
pub fn events_of(text: &str) -> Vec<Event> {
    yaml::parse_str(text).unwrap()
}

/// One line per event, ignoring styles and implicit flags
///
/// `+STR`, `+DOC`, `+MAP`, `+SEQ` open; `-…` close; `=VAL v` and `=ALI *a`
/// are leaves. Anchors are shown as `&a`.
pub fn tree_notation(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            Event::StreamStart => "+STR".to_string(),
            Event::StreamEnd => "-STR".to_string(),
            Event::DocumentStart { .. } => "+DOC".to_string(),
            Event::DocumentEnd { .. } => "-DOC".to_string(),
            Event::MappingStart(start) => with_anchor("+MAP", start.anchor.as_deref()),
            Event::MappingEnd => "-MAP".to_string(),
            Event::SequenceStart(start) => with_anchor("+SEQ", start.anchor.as_deref()),
            Event::SequenceEnd => "-SEQ".to_string(),
            Event::Scalar(scalar) => {
                with_anchor(&format!("=VAL {}", scalar.value), scalar.anchor.as_deref())
            }
            Event::Alias { anchor } => format!("=ALI *{anchor}"),
        })
        .collect()
}

/// Tree notation of a YAML text
pub fn tree_of(text: &str) -> Vec<String> {
    tree_notation(&events_of(text))
}

fn with_anchor(base: &str, anchor: Option<&str>) -> String {
    match anchor {
        Some(anchor) => format!("{base} &{anchor}"),
        None => base.to_string(),
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Yaml(String),
    NoValue,
    Fail(Vec<String>),
}

/// Evaluator replaying queued replies in call order
///
/// Panics when called more often than replies were queued.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    replies: VecDeque<Reply>,
    pub calls: Vec<(String, String)>,
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply whose result text is parsed as YAML
    #[must_use]
    pub fn reply_yaml(mut self, text: impl Into<String>) -> Self {
        self.replies.push_back(Reply::Yaml(text.into()));
        self
    }

    /// Queue a reply with no value
    #[must_use]
    pub fn no_value(mut self) -> Self {
        self.replies.push_back(Reply::NoValue);
        self
    }

    /// Queue a failing reply
    #[must_use]
    pub fn fail(mut self, diagnostic: &[&str]) -> Self {
        self.replies
            .push_back(Reply::Fail(diagnostic.iter().map(ToString::to_string).collect()));
        self
    }

    /// Replies not consumed yet
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    /// Bodies seen, in call order
    pub fn bodies(&self) -> Vec<&str> {
        self.calls.iter().map(|(_, body)| body.as_str()).collect()
    }
}

impl Evaluator for ScriptedEvaluator {
    fn evaluate(&mut self, target: &str, body: &str) -> Result<Evaluation> {
        self.calls.push((target.to_string(), body.to_string()));
        match self.replies.pop_front() {
            Some(Reply::Yaml(text)) => Ok(Evaluation::Events(yaml::parse_str(&text)?)),
            Some(Reply::NoValue) => Ok(Evaluation::NoValue),
            Some(Reply::Fail(diagnostic)) => Err(SpliceError::evaluation_failure(target, diagnostic)),
            None => panic!("unexpected evaluation of {body:?} for target {target:?}"),
        }
    }
}
