//! Line-delimited JSON session protocol
//!
//! One request line per evaluation, answered by exactly one reply line:
//!
//! ```text
//! → {"id":"<uuid>","code":"2 + 2"}
//! ← {"id":"<uuid>","status":"ok","result":"4"}
//! ← {"id":"<uuid>","status":"error","traceback":["Traceback ...", "..."]}
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Evaluation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Correlates the reply
    pub id: Uuid,
    /// Code to run
    pub code: String,
}

impl Request {
    /// Create request with a fresh id
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
        }
    }
}

/// Reply to one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reply {
    /// Code ran; `result` is the textual value, if any
    Ok {
        /// Request id
        id: Uuid,
        /// Value text, `None` when the code produced nothing
        #[serde(default)]
        result: Option<String>,
    },
    /// Code raised; diagnostic lines from the session
    Error {
        /// Request id
        id: Uuid,
        /// Diagnostic lines
        #[serde(default)]
        traceback: Vec<String>,
    },
}

impl Reply {
    /// Request this reply answers
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Ok { id, .. } | Self::Error { id, .. } => *id,
        }
    }
}
