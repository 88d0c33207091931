//! Evaluation sessions
//!
//! A session is a long-lived child process for one target. Requests go to
//! its stdin and replies come back on its stdout, one JSON line each; the
//! child's stderr is inherited so diagnostics and user prints stay visible
//! without polluting the YAML on our stdout.

use crate::config::TargetConfig;
use crate::error::{KernelError, Result};
use crate::protocol::{Reply, Request};
use crate::registry::SetupRegistry;
use indexmap::IndexMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Everything needed to start a session process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    /// Target the session serves
    pub target: String,
    /// Executable
    pub program: String,
    /// Arguments after the executable
    pub args: Vec<String>,
    /// Environment added to the inherited one
    pub env: IndexMap<String, String>,
}

impl Launch {
    /// Launch description for `target` from its configuration
    ///
    /// # Errors
    /// - `KernelError::EmptyCommand` if the command line is empty
    pub fn new(target: impl Into<String>, config: &TargetConfig) -> Result<Self> {
        let target = target.into();
        let Some((program, args)) = config.command.split_first() else {
            return Err(KernelError::EmptyCommand(target));
        };
        Ok(Self {
            target,
            program: program.clone(),
            args: args.to_vec(),
            env: config.env.clone(),
        })
    }
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteReply {
    /// Code ran; textual value when it produced one
    Value(Option<String>),
    /// Code failed; diagnostic lines
    Error(Vec<String>),
}

/// Running session process
#[derive(Debug)]
pub struct Session {
    target: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    grace: Duration,
    requests: usize,
    closed: bool,
}

impl Session {
    /// Start a session, entering the target's setup around the spawn
    ///
    /// # Errors
    /// - `KernelError::Setup` if the setup refuses
    /// - `KernelError::Spawn` if the process cannot be started
    pub fn launch(mut launch: Launch, setups: &SetupRegistry, grace: Duration) -> Result<Self> {
        let scope = setups.enter(&mut launch)?;

        let mut child = Command::new(&launch.program)
            .args(&launch.args)
            .envs(&launch.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| KernelError::Spawn {
                target: launch.target.clone(),
                program: launch.program.clone(),
                source,
            })?;
        drop(scope);

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(KernelError::SessionClosed(launch.target));
        };

        tracing::info!(session = %launch.target, pid = child.id(), program = %launch.program, "session started");
        Ok(Self {
            target: launch.target,
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            grace,
            requests: 0,
            closed: false,
        })
    }

    /// Target this session serves
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Requests answered so far
    #[inline]
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Session still accepts requests
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.closed
    }

    /// Run `code` and wait for its reply
    ///
    /// # Errors
    /// - `KernelError::SessionClosed` if the session is closed or exits
    /// - `KernelError::Io` if the pipes fail
    /// - `KernelError::Protocol` if the reply is malformed or answers
    ///   another request
    pub fn execute(&mut self, code: &str) -> Result<ExecuteReply> {
        let request = Request::new(code);
        let line = serde_json::to_string(&request)
            .map_err(|e| KernelError::protocol(&self.target, e.to_string()))?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| KernelError::SessionClosed(self.target.clone()))?;
        writeln!(stdin, "{line}")
            .and_then(|()| stdin.flush())
            .map_err(|e| KernelError::io(&self.target, e))?;
        tracing::trace!(session = %self.target, id = %request.id, "request sent");

        let mut reply_line = String::new();
        let read = self
            .stdout
            .read_line(&mut reply_line)
            .map_err(|e| KernelError::io(&self.target, e))?;
        if read == 0 {
            return Err(KernelError::SessionClosed(self.target.clone()));
        }

        let reply: Reply = serde_json::from_str(reply_line.trim_end()).map_err(|e| {
            KernelError::protocol(&self.target, format!("invalid reply line: {e}"))
        })?;
        if reply.id() != request.id {
            return Err(KernelError::protocol(
                &self.target,
                format!("reply for {} while waiting for {}", reply.id(), request.id),
            ));
        }
        self.requests += 1;
        tracing::trace!(session = %self.target, id = %request.id, "reply received");

        Ok(match reply {
            Reply::Ok { result, .. } => ExecuteReply::Value(result),
            Reply::Error { traceback, .. } => ExecuteReply::Error(traceback),
        })
    }

    /// Close the session: end its input, wait up to the grace period, then
    /// kill it
    ///
    /// Calling it again is a no-op.
    ///
    /// # Errors
    /// - `KernelError::Io` if waiting on or killing the process fails
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        drop(self.stdin.take());

        let deadline = Instant::now() + self.grace;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    tracing::info!(session = %self.target, %status, requests = self.requests, "session exited");
                    return Ok(());
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL_INTERVAL),
                Ok(None) => break,
                Err(e) => return Err(KernelError::io(&self.target, e)),
            }
        }

        tracing::warn!(session = %self.target, grace_ms = self.grace.as_millis(), "session did not exit, killing");
        self.child
            .kill()
            .and_then(|()| self.child.wait().map(drop))
            .map_err(|e| KernelError::io(&self.target, e))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(session = %self.target, error = %err, "session shutdown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_splits_command() {
        let config = TargetConfig::new(["python3", "-u", "driver.py"]).with_env("A", "1");
        let launch = Launch::new("py", &config).unwrap();
        assert_eq!(launch.target, "py");
        assert_eq!(launch.program, "python3");
        assert_eq!(launch.args, vec!["-u", "driver.py"]);
        assert_eq!(launch.env.get("A").map(String::as_str), Some("1"));
    }

    #[test]
    fn empty_command_rejected() {
        let config = TargetConfig::new(Vec::<String>::new());
        assert!(matches!(
            Launch::new("x", &config),
            Err(KernelError::EmptyCommand(target)) if target == "x"
        ));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let config = TargetConfig::new(["definitely-not-a-real-program-3141"]);
        let launch = Launch::new("x", &config).unwrap();
        let err = Session::launch(launch, &SetupRegistry::new(), Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, KernelError::Spawn { .. }));
    }
}
