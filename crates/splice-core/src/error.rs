//! Error types for the splice pipeline
//!
//! Every variant is fatal for the file being processed:
//! - Substitution results of the wrong shape
//! - Substitution results spanning several documents
//! - Backend evaluation failures
//! - Malformed input or output streams

/// Errors raised while splicing an event stream
#[derive(Debug, thiserror::Error)]
pub enum SpliceError {
    /// Produced value (or its absence) does not fit the position it replaces
    #[error("unexpected value kind: expected {expected}, got {actual}")]
    UnexpectedValueKind {
        /// What the position required
        expected: String,
        /// What was found instead
        actual: String,
    },

    /// Produced value resolves to more than one document
    #[error("substituted value contains multiple documents")]
    MultiDocument,

    /// Backend executed the code and reported a failure
    #[error("evaluation failed for target '{target}':\n{}", .diagnostic.join("\n"))]
    EvaluationFailure {
        /// Target the code ran under
        target: String,
        /// Backend diagnostic, one line per entry
        diagnostic: Vec<String>,
    },

    /// Backend could not be reached or misbehaved
    #[error("evaluation backend error for target '{target}': {source}")]
    Backend {
        /// Target whose session failed
        target: String,
        /// Underlying transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// End event without a matching start
    #[error("unbalanced event stream: {0}")]
    Unbalanced(String),

    /// Parser or emitter rejected the stream
    #[error("yaml error: {0}")]
    Yaml(#[from] libyaml_safer::Error),

    /// Emitter produced bytes that are not UTF-8
    #[error("serialized output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl SpliceError {
    /// Create unexpected value kind error
    pub fn unexpected(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::UnexpectedValueKind {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create evaluation failure carrying backend diagnostic lines
    pub fn evaluation_failure(target: impl Into<String>, diagnostic: Vec<String>) -> Self {
        Self::EvaluationFailure {
            target: target.into(),
            diagnostic,
        }
    }

    /// Wrap a transport-level error from the evaluation backend
    pub fn backend(
        target: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            target: target.into(),
            source: source.into(),
        }
    }
}

/// Result type alias for splice operations
pub type Result<T, E = SpliceError> = std::result::Result<T, E>;
