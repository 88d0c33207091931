//! Session pool
//!
//! One session per target, started lazily on first use and reused for the
//! rest of the run:
//! - Acquisition (launch or reuse)
//! - Orderly shutdown of every session, also on drop
//! - Pool statistics

use crate::config::KernelConfig;
use crate::error::{KernelError, Result};
use crate::registry::SetupRegistry;
use crate::session::{Launch, Session};
use indexmap::IndexMap;
use std::time::Duration;

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Sessions launched over the pool's lifetime
    pub launched: usize,
    /// Sessions currently open
    pub open: usize,
    /// Acquisitions served by an existing session
    pub reused: usize,
}

/// Sessions keyed by target identifier
#[derive(Debug)]
pub struct SessionPool {
    config: KernelConfig,
    setups: SetupRegistry,
    sessions: IndexMap<String, Session>,
    stats: PoolStats,
}

impl SessionPool {
    /// Create empty pool
    #[inline]
    #[must_use]
    pub fn new(config: KernelConfig, setups: SetupRegistry) -> Self {
        Self {
            config,
            setups,
            sessions: IndexMap::new(),
            stats: PoolStats::default(),
        }
    }

    /// Session for `target`, launching it on first use
    ///
    /// A session that failed at the transport level is replaced.
    ///
    /// # Errors
    /// - `KernelError::UnknownTarget` if the target is not configured
    /// - Any launch error from [`Session::launch`]
    pub fn get_or_create(&mut self, target: &str) -> Result<&mut Session> {
        if self.sessions.get(target).is_some_and(Session::is_open) {
            self.stats.reused += 1;
        } else {
            let launch = Launch::new(target, self.config.target(target)?)?;
            let grace = Duration::from_millis(self.config.shutdown_grace_ms);
            let session = Session::launch(launch, &self.setups, grace)?;
            // replacing a closed session drops it
            self.sessions.insert(target.to_string(), session);
            self.stats.launched += 1;
        }
        self.stats.open = self.sessions.values().filter(|s| s.is_open()).count();
        self.sessions
            .get_mut(target)
            .ok_or_else(|| KernelError::SessionClosed(target.to_string()))
    }

    /// Close the session for `target` after a transport failure
    pub fn discard(&mut self, target: &str) {
        if let Some(mut session) = self.sessions.shift_remove(target) {
            if let Err(err) = session.close() {
                tracing::warn!(session = target, error = %err, "discarding session failed");
            }
        }
        self.stats.open = self.sessions.len();
    }

    /// Shut down every session, in launch order
    ///
    /// All sessions are attempted; the first error is returned.
    ///
    /// # Errors
    /// Returns the first shutdown failure
    pub fn shutdown_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for (target, mut session) in self.sessions.drain(..) {
            if let Err(err) = session.close() {
                tracing::warn!(session = %target, error = %err, "session shutdown failed");
                first_error.get_or_insert(err);
            }
        }
        self.stats.open = 0;
        first_error.map_or(Ok(()), Err)
    }

    /// Targets with a session
    #[must_use]
    pub fn targets(&self) -> Vec<&str> {
        self.sessions.keys().map(String::as_str).collect()
    }

    /// Pool statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Configuration the pool launches from
    #[inline]
    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }
}

impl Drop for SessionPool {
    fn drop(&mut self) {
        if !self.sessions.is_empty() {
            let _ = self.shutdown_all();
        }
    }
}
