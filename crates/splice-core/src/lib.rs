//! Splice Core
//!
//! Rewrites a YAML event stream by evaluating code embedded in scalar
//! markers and merging the results back into the surrounding structure.
//!
//! # Markers
//!
//! A plain scalar of the form `(<mode>[target] <body><mode>)` is a marker:
//!
//! - `*` **suppress**: run for side effects, remove the node (and its key
//!   inside a mapping)
//! - `@` **splice**: merge the produced collection's members into the
//!   enclosing collection, dropping the key inside a mapping
//! - `!` **inline**: replace the node with the produced value
//!
//! # Architecture
//!
//! ```text
//! YAML text → EventReader → Splice ⇄ Evaluator → Prune → emit → YAML text
//!                             ↑
//!              ContextStack · PendingSlot · Trim
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use splice_core::{render, RenderOptions};
//!
//! let output = render("total: (!py 2 + 2!)\n", &mut gateway, &RenderOptions::default())?;
//! assert_eq!(output, "total: 4\n");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod context;
pub mod error;
pub mod evaluate;
pub mod event;
pub mod marker;
pub mod pending;
pub mod pipeline;
pub mod prune;
pub mod splice;
pub mod trim;
pub mod yaml;

// Re-exports for convenience
pub use error::{Result, SpliceError};
pub use evaluate::{Evaluation, Evaluator};
pub use event::{CollectionStart, CollectionStyle, Event, NodeKind, Scalar, ScalarStyle};
pub use marker::{Marker, Mode, DEFAULT_TARGET};
pub use pipeline::{render, RenderOptions};
pub use prune::Prune;
pub use splice::Splice;
pub use trim::{Trim, TrimMode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the splice pipeline
    pub use crate::error::{Result, SpliceError};
    pub use crate::evaluate::{Evaluation, Evaluator};
    pub use crate::event::{Event, NodeKind};
    pub use crate::marker::Mode;
    pub use crate::pipeline::{render, RenderOptions};
    pub use crate::prune::Prune;
    pub use crate::splice::Splice;
    pub use crate::yaml::{emit, parse_str, EventReader};
}
