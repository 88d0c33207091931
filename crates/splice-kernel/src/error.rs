//! Error types for evaluation sessions
//!
//! Covers:
//! - Unknown or misconfigured targets
//! - Session process spawn and I/O failures
//! - Protocol violations by a session
//! - Configuration file problems

use std::path::PathBuf;

/// Errors raised by the session backend
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// No command configured for the target
    #[error("unknown target '{0}': no session command configured")]
    UnknownTarget(String),

    /// Target configured with an empty command line
    #[error("target '{0}' has an empty command")]
    EmptyCommand(String),

    /// Session process could not be started
    #[error("failed to start session for '{target}' ({program}): {source}")]
    Spawn {
        /// Target being launched
        target: String,
        /// Program that failed to start
        program: String,
        /// Spawn failure
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to a session failed
    #[error("session I/O error for '{target}': {source}")]
    Io {
        /// Target of the session
        target: String,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Session exited or closed its output
    #[error("session for '{0}' closed unexpectedly")]
    SessionClosed(String),

    /// Session sent something that is not a valid reply
    #[error("protocol error from '{target}': {message}")]
    Protocol {
        /// Target of the session
        target: String,
        /// What was wrong with the reply
        message: String,
    },

    /// Setup hook refused to prepare the session
    #[error("setup for '{target}' failed: {message}")]
    Setup {
        /// Target being prepared
        target: String,
        /// Reason given by the hook
        message: String,
    },

    /// Configuration file could not be read or parsed
    #[error("configuration error in {}: {message}", .path.display())]
    Config {
        /// File that was being loaded
        path: PathBuf,
        /// Read or parse failure
        message: String,
    },
}

impl KernelError {
    /// Wrap an I/O error on an established session
    pub fn io(target: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            target: target.into(),
            source,
        }
    }

    /// Create protocol error
    pub fn protocol(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create configuration error
    pub fn config(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Session is unusable after this error
    #[inline]
    #[must_use]
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::SessionClosed(_) | Self::Protocol { .. }
        )
    }
}

/// Result type alias for kernel operations
pub type Result<T, E = KernelError> = std::result::Result<T, E>;
