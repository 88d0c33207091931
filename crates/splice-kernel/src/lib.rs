//! Splice Kernel
//!
//! Evaluation backend for yaml-splice markers: long-lived child processes,
//! one per target, speaking a line-delimited JSON protocol.
//!
//! # Architecture
//!
//! ```text
//! KernelGateway (Evaluator)
//!     └── SessionPool ── get_or_create(target) ──► Session (child process)
//!             │                                      ▲
//!             └── SetupRegistry ── enter/exit ───────┘ around the spawn
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod pool;
pub mod protocol;
pub mod registry;
pub mod session;

// Re-exports for convenience
pub use config::{KernelConfig, TargetConfig, PYTHON_DRIVER};
pub use error::{KernelError, Result};
pub use gateway::KernelGateway;
pub use pool::{PoolStats, SessionPool};
pub use registry::{NoopSetup, PythonSetup, SessionSetup, SetupRegistry, SetupScope};
pub use session::{ExecuteReply, Launch, Session};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
