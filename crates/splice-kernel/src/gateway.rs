//! Evaluator backed by the session pool

use crate::config::KernelConfig;
use crate::error::Result;
use crate::pool::{PoolStats, SessionPool};
use crate::registry::SetupRegistry;
use crate::session::ExecuteReply;
use splice_core::{yaml, Evaluation, Evaluator, SpliceError};

/// Runs marker bodies in pooled sessions and parses their results as YAML
#[derive(Debug)]
pub struct KernelGateway {
    pool: SessionPool,
}

impl KernelGateway {
    /// Create gateway launching sessions from `config`
    #[inline]
    #[must_use]
    pub fn new(config: KernelConfig, setups: SetupRegistry) -> Self {
        Self {
            pool: SessionPool::new(config, setups),
        }
    }

    /// Target for markers that name none
    #[inline]
    #[must_use]
    pub fn default_target(&self) -> &str {
        &self.pool.config().default_target
    }

    /// Run `code` in the session for `target`
    ///
    /// A session that fails at the transport level is discarded, so the
    /// next request for its target starts a fresh one.
    ///
    /// # Errors
    /// Any launch or session error
    pub fn execute(&mut self, target: &str, code: &str) -> Result<ExecuteReply> {
        let session = self.pool.get_or_create(target)?;
        let result = session.execute(code);
        if let Err(err) = &result {
            if err.is_fatal_for_session() {
                self.pool.discard(target);
            }
        }
        result
    }

    /// Shut down every session
    ///
    /// # Errors
    /// Returns the first shutdown failure
    pub fn shutdown(&mut self) -> Result<()> {
        self.pool.shutdown_all()
    }

    /// Pool statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

impl Evaluator for KernelGateway {
    fn evaluate(&mut self, target: &str, body: &str) -> splice_core::Result<Evaluation> {
        let reply = self
            .execute(target, body)
            .map_err(|err| SpliceError::backend(target, err))?;

        match reply {
            ExecuteReply::Value(None) => Ok(Evaluation::NoValue),
            ExecuteReply::Value(Some(text)) => {
                tracing::trace!(session = target, len = text.len(), "parsing result");
                Ok(Evaluation::Events(yaml::parse_str(&text)?))
            }
            ExecuteReply::Error(diagnostic) => Err(SpliceError::evaluation_failure(target, diagnostic)),
        }
    }
}
